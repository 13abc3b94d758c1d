#![no_std]

//! ESP32-S3 board layer for the SHIFTWATCH status device.
//!
//! Implements the core collaborator traits against real peripherals:
//! the I2C OLED, the machine sense inputs, the Wi-Fi connectivity
//! handle, and the flash-backed configuration store.

pub mod input;
pub mod network;
pub mod platform;
pub mod render;
pub mod storage;
