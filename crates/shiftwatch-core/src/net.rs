//! Network identity screen with change-gated redraws.

use core::fmt::Write as _;

use heapless::String;

use crate::terminal::{StatusTerminal, TextSize};

/// Capacity of the cached SSID text (802.11 limit).
pub const SSID_BYTES: usize = 32;
/// Capacity of the cached address text (dotted quad).
pub const ADDR_BYTES: usize = 15;
/// Address sentinel shown while the device holds no lease.
pub const NO_IP: &str = "No IP";

/// Current network identity as read from the network collaborator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NetworkView<'a> {
    pub ssid: &'a str,
    /// Dotted-quad address, or the [`NO_IP`] sentinel.
    pub addr: &'a str,
}

/// What a refresh call did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshOutcome {
    /// Identity matched the cache; the panel was not touched.
    Unchanged,
    /// The frame was cleared, redrawn, and committed.
    Redrawn,
}

/// Last-rendered identity cache.
///
/// Starts empty so the first refresh always paints. Owned by the caller
/// and passed into [`refresh`] explicitly; there is no hidden global.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetworkScreenState {
    last_ssid: String<SSID_BYTES>,
    last_addr: String<ADDR_BYTES>,
    valid: bool,
}

impl NetworkScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the next refresh to repaint, e.g. after another screen
    /// overwrote the frame.
    pub fn invalidate(&mut self) {
        self.last_ssid.clear();
        self.last_addr.clear();
        self.valid = false;
    }

    fn matches(&self, view: NetworkView<'_>) -> bool {
        self.valid
            && text_matches(&self.last_ssid, view.ssid)
            && text_matches(&self.last_addr, view.addr)
    }

    fn remember(&mut self, view: NetworkView<'_>) {
        copy_truncated(&mut self.last_ssid, view.ssid);
        copy_truncated(&mut self.last_addr, view.addr);
        self.valid = true;
    }
}

fn text_matches<const N: usize>(cached: &String<N>, current: &str) -> bool {
    // The cache stores at most N bytes; compare against the same prefix.
    let prefix_len = floor_char_boundary(current, N);
    cached.as_str() == &current[..prefix_len]
}

fn copy_truncated<const N: usize>(dst: &mut String<N>, src: &str) {
    dst.clear();
    let prefix_len = floor_char_boundary(src, N);
    // Cannot fail: the prefix fits by construction.
    let _ = dst.push_str(&src[..prefix_len]);
}

fn floor_char_boundary(text: &str, max_len: usize) -> usize {
    if text.len() <= max_len {
        return text.len();
    }

    let mut len = max_len;
    while len > 0 && !text.is_char_boundary(len) {
        len -= 1;
    }
    len
}

/// Repaints the network screen when the identity changed.
///
/// Layout matches the device faceplate: `Network: <ssid>`, a blank
/// spacer row, `IP: <addr>`. Terminal failures are swallowed; this is a
/// best-effort status indicator, and the cache still advances so a flaky
/// panel does not turn every poll into a redraw.
pub fn refresh<T>(
    state: &mut NetworkScreenState,
    view: NetworkView<'_>,
    term: &mut T,
) -> RefreshOutcome
where
    T: StatusTerminal,
{
    if state.matches(view) {
        return RefreshOutcome::Unchanged;
    }

    let _ = term.clear();
    let _ = term.set_text_size(TextSize::Small);
    let _ = term.set_cursor(0, 0);

    let mut line: String<{ SSID_BYTES + 9 }> = String::new();
    let _ = write!(line, "Network: {}", view.ssid);
    let _ = term.print_line(&line);
    let _ = term.print_line("");

    line.clear();
    let _ = write!(line, "IP: {}", view.addr);
    let _ = term.print_line(&line);

    let _ = term.commit();

    state.remember(view);
    RefreshOutcome::Redrawn
}
