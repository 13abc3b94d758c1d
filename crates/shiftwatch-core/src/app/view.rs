impl StatusApp {
    /// Draws the current screen.
    ///
    /// The network screen goes through the change-gated refresh, so
    /// calling this with unchanged identity costs only the comparison.
    /// Asset screens repaint unconditionally; [`StatusApp::tick`] gates
    /// how often that happens.
    pub fn render<T>(&mut self, now_ms: u64, net: NetworkView<'_>, term: &mut T) -> RefreshOutcome
    where
        T: StatusTerminal,
    {
        match self.ui {
            UiState::Network => net::refresh(&mut self.net_screen, net, term),
            UiState::Asset { index } => {
                self.render_asset(index, now_ms, term);
                RefreshOutcome::Redrawn
            }
        }
    }

    fn render_asset<T>(&self, index: u8, now_ms: u64, term: &mut T)
    where
        T: StatusTerminal,
    {
        let asset = index as usize;
        let Ok(name) = self.schedule.asset_name(asset) else {
            return;
        };
        let Ok(running) = self.monitor.running(asset) else {
            return;
        };
        let Ok(age_ms) = self.monitor.state_age_ms(asset, now_ms) else {
            return;
        };

        let stats = AssetStats::collect(&self.events, index, running, age_ms);
        let on_shift = self
            .clock
            .is_some_and(|now| matches!(self.schedule.active_shift(asset, now), Ok(Some(_))));

        // Best-effort status panel; peripheral failures stay local.
        let _ = term.clear();
        let _ = term.set_text_size(TextSize::Large);
        let _ = term.set_cursor(0, 0);
        let _ = term.print_line(name);

        let _ = term.set_text_size(TextSize::Small);
        let _ = term.set_cursor(0, 2);

        let mut line: String<LINE_BYTES> = String::new();
        let state = if running { "RUNNING" } else { "STOPPED" };
        let _ = if on_shift {
            write!(line, "{state}  ON SHIFT")
        } else {
            write!(line, "{state}  {}m", age_ms / 60_000)
        };
        let _ = term.print_line(&line);

        line.clear();
        let _ = write!(
            line,
            "Up {}.{}%  stops {}",
            stats.uptime_permille / 10,
            stats.uptime_permille % 10,
            stats.stops
        );
        let _ = term.print_line(&line);

        line.clear();
        let _ = write!(
            line,
            "MTBF {}m MTTR {}m",
            stats.mtbf_secs / 60,
            stats.mttr_secs / 60
        );
        let _ = term.print_line(&line);

        let _ = term.commit();
    }
}
