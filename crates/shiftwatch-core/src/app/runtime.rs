impl StatusApp {
    pub fn new(schedule: ShiftSchedule, now_ms: u64) -> Self {
        Self {
            schedule,
            monitor: AssetMonitor::new(now_ms),
            events: EventLog::new(),
            net_screen: NetworkScreenState::new(),
            clock: None,
            ui: UiState::Network,
            next_rotate_ms: now_ms + SCREEN_DWELL_MS,
            next_stats_ms: now_ms + STATS_REFRESH_MS,
            pending_redraw: true,
        }
    }

    /// Advances rotation and reports whether the caller should render.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        if now_ms >= self.next_rotate_ms {
            self.advance_screen(now_ms);
        }

        if matches!(self.ui, UiState::Asset { .. }) && now_ms >= self.next_stats_ms {
            self.next_stats_ms = now_ms + STATS_REFRESH_MS;
            self.pending_redraw = true;
        }

        if self.pending_redraw {
            self.pending_redraw = false;
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    /// Feeds one sense sample; transitions land in the event history and
    /// repaint the affected screen when it is visible.
    pub fn record_sample(
        &mut self,
        asset: usize,
        running: bool,
        now_ms: u64,
    ) -> Result<Option<AssetEvent>, ConfigError> {
        let event = self.monitor.observe(asset, running, now_ms)?;

        if let Some(event) = event {
            self.events.push(event);
            if self.ui == (UiState::Asset { index: event.asset }) {
                self.pending_redraw = true;
            }
        }

        Ok(event)
    }

    /// Supplies the wall-clock time of day, when a source for it exists.
    /// Without one, screens omit the on-shift marker.
    pub fn set_clock(&mut self, clock: Option<ShiftTime>) {
        if self.clock != clock {
            self.clock = clock;
            if matches!(self.ui, UiState::Asset { .. }) {
                self.pending_redraw = true;
            }
        }
    }

    pub fn schedule(&self) -> &ShiftSchedule {
        &self.schedule
    }

    /// Mutable store access for the provisioning path.
    pub fn schedule_mut(&mut self) -> &mut ShiftSchedule {
        self.pending_redraw = true;
        &mut self.schedule
    }

    fn advance_screen(&mut self, now_ms: u64) {
        self.next_rotate_ms = now_ms + SCREEN_DWELL_MS;

        let next = self.next_screen();
        if next == self.ui {
            return;
        }

        if next == UiState::Network {
            // Another screen overwrote the frame; repaint on return.
            self.net_screen.invalidate();
        }

        debug!("screen {:?} -> {:?}", self.ui, next);
        self.ui = next;
        self.next_stats_ms = now_ms + STATS_REFRESH_MS;
        self.pending_redraw = true;
    }

    fn next_screen(&self) -> UiState {
        let from = match self.ui {
            UiState::Network => 0,
            UiState::Asset { index } => index as usize + 1,
        };

        match self.named_asset_at_or_after(from) {
            Some(index) => UiState::Asset { index },
            None => UiState::Network,
        }
    }

    fn named_asset_at_or_after(&self, start: usize) -> Option<u8> {
        (start..MAX_ASSETS)
            .find(|&asset| {
                self.schedule
                    .asset(asset)
                    .is_ok_and(AssetConfig::is_named)
            })
            .map(|asset| asset as u8)
    }
}
