//! GPIO machine run/stop sense inputs.

use embedded_hal::digital::InputPin;
use heapless::Vec;
use shiftwatch_core::sense::RunSense;

#[derive(Debug, Clone, Copy)]
pub struct RunSenseConfig {
    running_level_high: bool,
}

impl Default for RunSenseConfig {
    fn default() -> Self {
        // Pull-up inputs with a normally-open stop contact: high while
        // the machine runs.
        Self {
            running_level_high: true,
        }
    }
}

impl RunSenseConfig {
    pub const fn with_running_level_high(mut self, running_level_high: bool) -> Self {
        self.running_level_high = running_level_high;
        self
    }
}

#[derive(Debug)]
pub enum RunSenseError<PinErr> {
    Pin(PinErr),
    /// Asset index has no wired channel.
    UnknownChannel,
}

/// [`RunSense`] over a bounded list of input pins, one per asset,
/// in asset-index order.
#[derive(Debug)]
pub struct GpioRunSense<PIN, const N: usize> {
    pins: Vec<PIN, N>,
    config: RunSenseConfig,
}

impl<PIN, const N: usize> GpioRunSense<PIN, N>
where
    PIN: InputPin,
{
    pub fn new(pins: Vec<PIN, N>, config: RunSenseConfig) -> Self {
        Self { pins, config }
    }
}

impl<PIN, const N: usize> RunSense for GpioRunSense<PIN, N>
where
    PIN: InputPin,
{
    type Error = RunSenseError<PIN::Error>;

    fn asset_count(&self) -> usize {
        self.pins.len()
    }

    fn is_running(&mut self, asset: usize) -> Result<bool, Self::Error> {
        let pin = self
            .pins
            .get_mut(asset)
            .ok_or(RunSenseError::UnknownChannel)?;

        let high = pin.is_high().map_err(RunSenseError::Pin)?;
        Ok(high == self.config.running_level_high)
    }
}
