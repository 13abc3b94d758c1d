#![cfg_attr(not(test), no_std)]

//! Hardware-independent core for the SHIFTWATCH shop-floor status device.
//!
//! Holds the bounded shift/asset configuration store, the run/stop
//! monitor and its event history, and the poll-driven status screen
//! state machine. Hardware is reached only through the collaborator
//! traits in [`terminal`], [`sense`], and [`settings`].

pub mod app;
pub mod events;
pub mod monitor;
pub mod net;
pub mod schedule;
pub mod sense;
pub mod settings;
pub mod terminal;
