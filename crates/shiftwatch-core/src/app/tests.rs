use super::*;
use crate::terminal::testkit::{RecordingTerminal, TerminalOp};

const NET: NetworkView<'_> = NetworkView {
    ssid: "plant-floor",
    addr: "192.168.1.5",
};

fn two_asset_schedule() -> ShiftSchedule {
    let mut schedule = ShiftSchedule::new();
    schedule.set_asset_name(0, "Press").unwrap();
    schedule.set_asset_name(3, "Lathe").unwrap();
    schedule.set_shift_span(0, 0, "06:00", "14:00").unwrap();
    schedule
}

fn drain_first_render(app: &mut StatusApp, term: &mut RecordingTerminal) {
    assert_eq!(app.tick(0), TickResult::RenderRequested);
    app.render(0, NET, term);
}

#[test]
fn boot_renders_the_network_screen_first() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    let mut term = RecordingTerminal::new();

    assert_eq!(app.tick(0), TickResult::RenderRequested);
    assert_eq!(app.render(0, NET, &mut term), RefreshOutcome::Redrawn);
    assert!(
        term.ops
            .contains(&TerminalOp::Line("Network: plant-floor".into()))
    );

    assert_eq!(app.tick(1), TickResult::NoRender);
}

#[test]
fn screens_rotate_through_named_assets_and_back() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    let mut seen_first_lines = std::vec::Vec::new();
    let mut now = 0u64;
    for _ in 0..3 {
        now += SCREEN_DWELL_MS;
        assert_eq!(app.tick(now), TickResult::RenderRequested);

        term.ops.clear();
        app.render(now, NET, &mut term);
        let first_line = term
            .ops
            .iter()
            .find_map(|op| match op {
                TerminalOp::Line(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        seen_first_lines.push(first_line);
    }

    assert_eq!(seen_first_lines[0], "Press");
    assert_eq!(seen_first_lines[1], "Lathe");
    assert_eq!(seen_first_lines[2], "Network: plant-floor");
}

#[test]
fn returning_to_the_network_screen_repaints_unchanged_identity() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    // Unchanged identity while the network screen is up: no repaint.
    assert_eq!(app.render(1, NET, &mut term), RefreshOutcome::Unchanged);

    // Rotate out to both assets and back.
    for step in 1..=3u64 {
        app.tick(step * SCREEN_DWELL_MS);
        app.render(step * SCREEN_DWELL_MS, NET, &mut term);
    }

    let commits = term.commits();
    assert_eq!(
        app.render(3 * SCREEN_DWELL_MS + 1, NET, &mut term),
        RefreshOutcome::Unchanged
    );
    assert_eq!(term.commits(), commits);
}

#[test]
fn rotation_stays_on_network_when_nothing_is_provisioned() {
    let mut app = StatusApp::new(ShiftSchedule::new(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    assert_eq!(app.tick(SCREEN_DWELL_MS), TickResult::NoRender);
    assert_eq!(app.tick(2 * SCREEN_DWELL_MS), TickResult::NoRender);
}

#[test]
fn transition_on_the_visible_asset_requests_a_render() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    // Move to the Press screen.
    app.tick(SCREEN_DWELL_MS);
    app.render(SCREEN_DWELL_MS, NET, &mut term);

    let event = app
        .record_sample(0, false, SCREEN_DWELL_MS + 10)
        .unwrap()
        .unwrap();
    assert_eq!(event.kind, crate::monitor::EventKind::Stopped);

    assert_eq!(app.tick(SCREEN_DWELL_MS + 11), TickResult::RenderRequested);
    term.ops.clear();
    app.render(SCREEN_DWELL_MS + 11, NET, &mut term);
    assert!(term.ops.contains(&TerminalOp::Line("Press".into())));
    assert!(
        term.ops
            .iter()
            .any(|op| matches!(op, TerminalOp::Line(text) if text.starts_with("STOPPED")))
    );
}

#[test]
fn transition_on_a_hidden_asset_stays_quiet_until_its_screen() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    // Lathe stops while the network screen is up.
    assert!(app.record_sample(3, false, 100).unwrap().is_some());
    assert_eq!(app.tick(101), TickResult::NoRender);
}

#[test]
fn visible_asset_screen_refreshes_its_figures_periodically() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    app.tick(SCREEN_DWELL_MS);
    app.render(SCREEN_DWELL_MS, NET, &mut term);

    assert_eq!(app.tick(SCREEN_DWELL_MS + 10), TickResult::NoRender);
    assert_eq!(
        app.tick(SCREEN_DWELL_MS + STATS_REFRESH_MS),
        TickResult::RenderRequested
    );
}

#[test]
fn on_shift_marker_needs_a_clock_source() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    app.tick(SCREEN_DWELL_MS);
    term.ops.clear();
    app.render(SCREEN_DWELL_MS, NET, &mut term);
    assert!(
        !term
            .ops
            .iter()
            .any(|op| matches!(op, TerminalOp::Line(text) if text.contains("ON SHIFT")))
    );

    app.set_clock(Some(ShiftTime::parse("09:30").unwrap()));
    assert_eq!(
        app.tick(SCREEN_DWELL_MS + 1),
        TickResult::RenderRequested
    );
    term.ops.clear();
    app.render(SCREEN_DWELL_MS + 1, NET, &mut term);
    assert!(
        term.ops
            .iter()
            .any(|op| matches!(op, TerminalOp::Line(text) if text.contains("ON SHIFT")))
    );
}

#[test]
fn provisioning_new_assets_extends_the_rotation() {
    let mut app = StatusApp::new(ShiftSchedule::new(), 0);
    let mut term = RecordingTerminal::new();
    drain_first_render(&mut app, &mut term);

    app.schedule_mut().set_asset_name(5, "Welder").unwrap();

    assert_eq!(app.tick(SCREEN_DWELL_MS), TickResult::RenderRequested);
    term.ops.clear();
    app.render(SCREEN_DWELL_MS, NET, &mut term);
    assert!(term.ops.contains(&TerminalOp::Line("Welder".into())));
}

#[test]
fn out_of_range_sample_is_rejected() {
    let mut app = StatusApp::new(two_asset_schedule(), 0);
    assert_eq!(
        app.record_sample(MAX_ASSETS, true, 0),
        Err(ConfigError::InvalidIndex)
    );
}
