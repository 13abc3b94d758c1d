//! Board-level OLED adapter for the UG-2864HSWEG01 module.

use embedded_hal::{delay::DelayNs, i2c::I2c};
use ug2864::{Config as PanelConfig, FrameBuffer, Ug2864};

/// Supply settle time before the charge pump may start.
const POWER_ON_DELAY_US: u32 = 100_000;

pub type DisplayError<I2cErr> = ug2864::Error<I2cErr>;

/// Minimal board-level display adapter.
#[derive(Debug)]
pub struct Oled<I2C> {
    driver: Ug2864<I2C>,
}

impl<I2C> Oled<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, config: PanelConfig) -> Self {
        Self {
            driver: Ug2864::new(i2c, config),
        }
    }

    /// Waits for the supply to settle, then runs the panel bring-up.
    pub fn initialize<D>(&mut self, delay: &mut D) -> Result<(), DisplayError<I2C::Error>>
    where
        D: DelayNs,
    {
        delay.delay_us(POWER_ON_DELAY_US);
        self.driver.initialize()
    }

    /// Pushes an all-dark frame.
    pub fn clear_panel(&mut self) -> Result<(), DisplayError<I2C::Error>> {
        let frame = FrameBuffer::new();
        self.driver.flush_full(frame.bytes())
    }

    /// Flushes a full framebuffer.
    pub fn flush_frame(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError<I2C::Error>> {
        self.driver.flush_full(frame.bytes())
    }

    /// Releases the owned bus.
    pub fn release(self) -> I2C {
        self.driver.release()
    }
}
