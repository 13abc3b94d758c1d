//! Poll-driven status screen state machine.

use core::fmt::Write as _;

use heapless::String;
use log::debug;

use crate::{
    events::{AssetStats, EventLog},
    monitor::{AssetEvent, AssetMonitor},
    net::{self, NetworkScreenState, NetworkView, RefreshOutcome},
    schedule::{AssetConfig, ConfigError, MAX_ASSETS, ShiftSchedule, ShiftTime},
    terminal::{StatusTerminal, TextSize},
};

/// How long each screen stays up before rotating.
pub const SCREEN_DWELL_MS: u64 = 4_000;
/// How often a visible asset screen refreshes its figures.
const STATS_REFRESH_MS: u64 = 1_000;

const LINE_BYTES: usize = 24;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum UiState {
    Network,
    Asset { index: u8 },
}

/// Owns the configuration store, the monitor, the event history, and the
/// screen rotation; hardware stays behind the terminal contract.
pub struct StatusApp {
    schedule: ShiftSchedule,
    monitor: AssetMonitor,
    events: EventLog,
    net_screen: NetworkScreenState,
    clock: Option<ShiftTime>,
    ui: UiState,
    next_rotate_ms: u64,
    next_stats_ms: u64,
    pending_redraw: bool,
}

include!("runtime.rs");
include!("view.rs");

#[cfg(test)]
mod tests;
