#![cfg_attr(not(test), no_std)]

//! UG-2864HSWEG01 (0.96" 128x64 SSD1306 OLED, I2C) driver primitives.

mod framebuffer;
pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use framebuffer::FrameBuffer;

use embedded_hal::i2c::I2c;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// 7-bit I2C address of the module.
    pub address: u8,
    /// Mirror columns (module mounted left-right swapped).
    pub flip_horizontal: bool,
    /// Mirror rows (module mounted upside down).
    pub flip_vertical: bool,
    /// Initial contrast level.
    pub contrast: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: protocol::DEFAULT_ADDRESS,
            flip_horizontal: false,
            flip_vertical: false,
            contrast: 0xCF,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<I2cErr> {
    /// I2C transaction failed.
    I2c(I2cErr),
    /// Input parameters are outside supported bounds.
    InvalidInput,
}

pub type DriverResult<I2cErr> = Result<(), Error<I2cErr>>;

/// SSD1306 driver over a shared or exclusive I2C bus.
#[derive(Debug)]
pub struct Ug2864<I2C> {
    i2c: I2C,
    config: Config,
}

impl<I2C> Ug2864<I2C>
where
    I2C: I2c,
{
    /// Creates a new driver instance.
    pub fn new(i2c: I2C, config: Config) -> Self {
        Self { i2c, config }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases the owned bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Runs the bring-up command sequence and turns the panel on.
    pub fn initialize(&mut self) -> DriverResult<I2C::Error> {
        let packet = protocol::build_init_packet(
            self.config.flip_horizontal,
            self.config.flip_vertical,
            self.config.contrast,
        );
        self.i2c
            .write(self.config.address, &packet)
            .map_err(Error::I2c)
    }

    /// Turns the panel output on.
    pub fn display_on(&mut self) -> DriverResult<I2C::Error> {
        let packet = protocol::build_command_packet(protocol::display_on_command());
        self.i2c
            .write(self.config.address, &packet)
            .map_err(Error::I2c)
    }

    /// Turns the panel output off (RAM contents are retained).
    pub fn display_off(&mut self) -> DriverResult<I2C::Error> {
        let packet = protocol::build_command_packet(protocol::display_off_command());
        self.i2c
            .write(self.config.address, &packet)
            .map_err(Error::I2c)
    }

    /// Updates the contrast level.
    pub fn set_contrast(&mut self, level: u8) -> DriverResult<I2C::Error> {
        self.config.contrast = level;
        let packet = protocol::build_contrast_packet(level);
        self.i2c
            .write(self.config.address, &packet)
            .map_err(Error::I2c)
    }

    /// Flushes a full framebuffer: address window, then one data stream.
    pub fn flush_full(&mut self, buffer: &[u8; protocol::BUFFER_SIZE]) -> DriverResult<I2C::Error> {
        let window = protocol::build_window_packet();
        self.i2c
            .write(self.config.address, &window)
            .map_err(Error::I2c)?;

        let mut packet = [0u8; protocol::BUFFER_SIZE + 1];
        packet[0] = protocol::CTRL_DATA;
        packet[1..].copy_from_slice(buffer);

        self.i2c
            .write(self.config.address, &packet)
            .map_err(Error::I2c)
    }
}
