//! Run/stop transition detection over polled sense samples.

use crate::schedule::{ConfigError, MAX_ASSETS};

/// State an asset transitioned *into*.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    Running,
    Stopped,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
        }
    }
}

/// One observed transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AssetEvent {
    pub asset: u8,
    pub kind: EventKind,
    /// Monotonic timestamp of the transition.
    pub at_ms: u64,
    /// How long the previous state lasted.
    pub duration_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct RunState {
    running: bool,
    since_ms: u64,
}

/// Per-asset current state tracker.
///
/// Assets are assumed running at startup; the first observed sample
/// either confirms that or produces a `Stopped` transition.
pub struct AssetMonitor {
    states: [RunState; MAX_ASSETS],
}

impl AssetMonitor {
    pub fn new(start_ms: u64) -> Self {
        Self {
            states: [RunState {
                running: true,
                since_ms: start_ms,
            }; MAX_ASSETS],
        }
    }

    /// Feeds one sense sample. Returns the transition event, if any.
    pub fn observe(
        &mut self,
        asset: usize,
        running: bool,
        now_ms: u64,
    ) -> Result<Option<AssetEvent>, ConfigError> {
        let state = self
            .states
            .get_mut(asset)
            .ok_or(ConfigError::InvalidIndex)?;

        if state.running == running {
            return Ok(None);
        }

        let duration_ms = now_ms.saturating_sub(state.since_ms);
        state.running = running;
        state.since_ms = now_ms;

        Ok(Some(AssetEvent {
            asset: asset as u8,
            kind: if running {
                EventKind::Running
            } else {
                EventKind::Stopped
            },
            at_ms: now_ms,
            duration_ms,
        }))
    }

    pub fn running(&self, asset: usize) -> Result<bool, ConfigError> {
        self.states
            .get(asset)
            .map(|state| state.running)
            .ok_or(ConfigError::InvalidIndex)
    }

    /// How long the asset has been in its current state.
    pub fn state_age_ms(&self, asset: usize, now_ms: u64) -> Result<u64, ConfigError> {
        self.states
            .get(asset)
            .map(|state| now_ms.saturating_sub(state.since_ms))
            .ok_or(ConfigError::InvalidIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assets_start_out_assumed_running() {
        let monitor = AssetMonitor::new(0);
        assert_eq!(monitor.running(0), Ok(true));
        assert_eq!(monitor.running(MAX_ASSETS - 1), Ok(true));
    }

    #[test]
    fn matching_sample_produces_no_event() {
        let mut monitor = AssetMonitor::new(0);
        assert_eq!(monitor.observe(0, true, 1_000), Ok(None));
        assert_eq!(monitor.state_age_ms(0, 5_000), Ok(5_000));
    }

    #[test]
    fn transition_carries_the_previous_state_duration() {
        let mut monitor = AssetMonitor::new(1_000);

        let stopped = monitor.observe(2, false, 61_000).unwrap().unwrap();
        assert_eq!(stopped.kind, EventKind::Stopped);
        assert_eq!(stopped.at_ms, 61_000);
        assert_eq!(stopped.duration_ms, 60_000);
        assert_eq!(monitor.running(2), Ok(false));

        let restarted = monitor.observe(2, true, 75_000).unwrap().unwrap();
        assert_eq!(restarted.kind, EventKind::Running);
        assert_eq!(restarted.duration_ms, 14_000);
    }

    #[test]
    fn out_of_range_asset_is_rejected() {
        let mut monitor = AssetMonitor::new(0);
        assert_eq!(
            monitor.observe(MAX_ASSETS, true, 0),
            Err(ConfigError::InvalidIndex)
        );
        assert_eq!(monitor.running(MAX_ASSETS), Err(ConfigError::InvalidIndex));
    }
}
