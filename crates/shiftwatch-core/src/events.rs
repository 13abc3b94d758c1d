//! Bounded event history and availability statistics.

use heapless::Deque;

use crate::monitor::{AssetEvent, EventKind};

/// Default retention of the in-memory event log.
pub const EVENT_LOG_CAPACITY: usize = 128;

/// Fixed-capacity transition history; oldest entries are evicted when
/// full.
pub struct EventLog<const CAP: usize = EVENT_LOG_CAPACITY> {
    entries: Deque<AssetEvent, CAP>,
}

impl<const CAP: usize> EventLog<CAP> {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    pub fn push(&mut self, event: AssetEvent) {
        if self.entries.is_full() {
            let _ = self.entries.pop_front();
        }
        let _ = self.entries.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetEvent> {
        self.entries.iter()
    }

    pub fn latest_for(&self, asset: u8) -> Option<&AssetEvent> {
        self.entries.iter().filter(|event| event.asset == asset).last()
    }
}

impl<const CAP: usize> Default for EventLog<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Availability figures for one asset over the retained window.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AssetStats {
    /// Running share of the observed time, in permille.
    pub uptime_permille: u16,
    /// Mean closed run duration in seconds (0 when no run has closed).
    pub mtbf_secs: u32,
    /// Mean closed stop duration in seconds (0 when no stop has closed).
    pub mttr_secs: u32,
    /// Number of recorded stop transitions.
    pub stops: u16,
}

impl AssetStats {
    /// Computes stats from the retained events plus the open period the
    /// asset is currently in (`running_now` for `open_state_age_ms`).
    ///
    /// A `Stopped` event closes a run period and carries its length; a
    /// `Running` event closes a stop period.
    pub fn collect<const CAP: usize>(
        log: &EventLog<CAP>,
        asset: u8,
        running_now: bool,
        open_state_age_ms: u64,
    ) -> Self {
        let mut run_ms: u64 = 0;
        let mut stop_ms: u64 = 0;
        let mut stops: u32 = 0;
        let mut recoveries: u32 = 0;

        for event in log.iter().filter(|event| event.asset == asset) {
            match event.kind {
                EventKind::Stopped => {
                    run_ms = run_ms.saturating_add(event.duration_ms);
                    stops += 1;
                }
                EventKind::Running => {
                    stop_ms = stop_ms.saturating_add(event.duration_ms);
                    recoveries += 1;
                }
            }
        }

        let open_run_ms = if running_now { open_state_age_ms } else { 0 };
        let observed_ms = run_ms + stop_ms + open_state_age_ms;

        let uptime_permille = if observed_ms == 0 {
            if running_now { 1_000 } else { 0 }
        } else {
            ((run_ms + open_run_ms) * 1_000 / observed_ms) as u16
        };

        Self {
            uptime_permille,
            mtbf_secs: mean_secs(run_ms, stops),
            mttr_secs: mean_secs(stop_ms, recoveries),
            stops: stops.min(u16::MAX as u32) as u16,
        }
    }
}

fn mean_secs(total_ms: u64, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }

    (total_ms / count as u64 / 1_000).min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::AssetMonitor;

    fn event(asset: u8, kind: EventKind, at_ms: u64, duration_ms: u64) -> AssetEvent {
        AssetEvent {
            asset,
            kind,
            at_ms,
            duration_ms,
        }
    }

    #[test]
    fn log_evicts_oldest_when_full() {
        let mut log: EventLog<3> = EventLog::new();
        for i in 0..5u64 {
            log.push(event(0, EventKind::Stopped, i * 1_000, 100));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.iter().next().unwrap().at_ms, 2_000);
        assert_eq!(log.latest_for(0).unwrap().at_ms, 4_000);
        assert!(log.latest_for(1).is_none());
    }

    #[test]
    fn stats_use_closed_periods_for_means() {
        let mut log: EventLog<16> = EventLog::new();
        // Two closed runs (60 s, 120 s) and two closed stops (30 s, 10 s).
        log.push(event(1, EventKind::Stopped, 60_000, 60_000));
        log.push(event(1, EventKind::Running, 90_000, 30_000));
        log.push(event(1, EventKind::Stopped, 210_000, 120_000));
        log.push(event(1, EventKind::Running, 220_000, 10_000));

        let stats = AssetStats::collect(&log, 1, true, 20_000);
        assert_eq!(stats.mtbf_secs, 90);
        assert_eq!(stats.mttr_secs, 20);
        assert_eq!(stats.stops, 2);
        // 180 s closed run + 20 s open run over 240 s observed.
        assert_eq!(stats.uptime_permille, 833);
    }

    #[test]
    fn stats_without_events_reflect_the_open_state() {
        let log: EventLog<8> = EventLog::new();

        let up = AssetStats::collect(&log, 0, true, 5_000);
        assert_eq!(up.uptime_permille, 1_000);
        assert_eq!(up.mtbf_secs, 0);

        let down = AssetStats::collect(&log, 0, false, 5_000);
        assert_eq!(down.uptime_permille, 0);

        let fresh = AssetStats::collect(&log, 0, true, 0);
        assert_eq!(fresh.uptime_permille, 1_000);
    }

    #[test]
    fn stats_ignore_other_assets() {
        let mut log: EventLog<8> = EventLog::new();
        log.push(event(0, EventKind::Stopped, 10_000, 10_000));
        log.push(event(3, EventKind::Stopped, 10_000, 99_000));

        let stats = AssetStats::collect(&log, 0, false, 2_000);
        assert_eq!(stats.stops, 1);
        assert_eq!(stats.mtbf_secs, 10);
        // 10 s run over 12 s observed.
        assert_eq!(stats.uptime_permille, 833);
    }

    #[test]
    fn monitor_feed_matches_collect_expectations() {
        let mut monitor = AssetMonitor::new(0);
        let mut log: EventLog<8> = EventLog::new();

        if let Some(event) = monitor.observe(0, false, 40_000).unwrap() {
            log.push(event);
        }
        if let Some(event) = monitor.observe(0, true, 50_000).unwrap() {
            log.push(event);
        }

        let age = monitor.state_age_ms(0, 60_000).unwrap();
        let stats = AssetStats::collect(&log, 0, monitor.running(0).unwrap(), age);

        // 40 s run + 10 s open run over 60 s observed.
        assert_eq!(stats.uptime_permille, 833);
        assert_eq!(stats.mtbf_secs, 40);
        assert_eq!(stats.mttr_secs, 10);
    }
}
