pub mod run_sense;
