//! Wi-Fi/network connectivity state shared between async network workers
//! and the UI loop.

use core::fmt::Write as _;
use core::net::Ipv4Addr;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use heapless::String;
use shiftwatch_core::net::{ADDR_BYTES, NO_IP};

/// High-level connectivity state for UI + logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ConnectivityState {
    Disconnected = 0,
    Connecting = 1,
    LinkUpNoIp = 2,
    Connected = 3,
}

impl ConnectivityState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Connecting,
            2 => Self::LinkUpNoIp,
            3 => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

/// Wi-Fi credentials source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl WifiConfig {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }
}

/// Immutable connectivity snapshot for the renderer and board loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectivitySnapshot {
    pub state: ConnectivityState,
    pub link_up: bool,
    pub ipv4: Option<Ipv4Addr>,
    pub revision: u32,
}

impl ConnectivitySnapshot {
    pub const fn disconnected() -> Self {
        Self {
            state: ConnectivityState::Disconnected,
            link_up: false,
            ipv4: None,
            revision: 0,
        }
    }

    /// Address text for the status screen: dotted quad while a lease is
    /// held, the `No IP` sentinel otherwise.
    pub fn addr_text(&self) -> String<ADDR_BYTES> {
        let mut text = String::new();
        match self.ipv4 {
            Some(addr) => {
                let _ = write!(text, "{addr}");
            }
            None => {
                let _ = text.push_str(NO_IP);
            }
        }
        text
    }
}

/// Lock-free shared connectivity status.
///
/// An all-zero IPv4 word doubles as the no-lease marker; DHCP never
/// hands out 0.0.0.0.
#[derive(Debug)]
pub struct ConnectivityHandle {
    state: AtomicU8,
    link_up: AtomicBool,
    ipv4: AtomicU32,
    revision: AtomicU32,
}

impl ConnectivityHandle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectivityState::Disconnected as u8),
            link_up: AtomicBool::new(false),
            ipv4: AtomicU32::new(0),
            revision: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> ConnectivitySnapshot {
        let ipv4 = self.ipv4.load(Ordering::Acquire);
        ConnectivitySnapshot {
            state: ConnectivityState::from_raw(self.state.load(Ordering::Acquire)),
            link_up: self.link_up.load(Ordering::Acquire),
            ipv4: (ipv4 != 0).then(|| Ipv4Addr::from_bits(ipv4)),
            revision: self.revision.load(Ordering::Acquire),
        }
    }

    pub fn mark_connecting(&self) {
        let mut changed = false;
        changed |= self.store_ipv4(None);
        changed |= self.store_state(ConnectivityState::Connecting);
        if changed {
            self.bump_revision();
        }
    }

    pub fn mark_disconnected(&self) {
        let mut changed = false;
        changed |= self.store_bool(&self.link_up, false);
        changed |= self.store_ipv4(None);
        changed |= self.store_state(ConnectivityState::Disconnected);
        if changed {
            self.bump_revision();
        }
    }

    pub fn update_link_ip(&self, link_up: bool, ipv4: Option<Ipv4Addr>) {
        let mut changed = false;
        changed |= self.store_bool(&self.link_up, link_up);
        changed |= self.store_ipv4(ipv4);
        changed |= self.store_state(Self::state_for(link_up, ipv4.is_some()));

        if changed {
            self.bump_revision();
        }
    }

    fn state_for(link_up: bool, has_ipv4: bool) -> ConnectivityState {
        if !link_up {
            ConnectivityState::Disconnected
        } else if !has_ipv4 {
            ConnectivityState::LinkUpNoIp
        } else {
            ConnectivityState::Connected
        }
    }

    fn store_state(&self, next: ConnectivityState) -> bool {
        self.state.swap(next as u8, Ordering::AcqRel) != next as u8
    }

    fn store_bool(&self, cell: &AtomicBool, next: bool) -> bool {
        cell.swap(next, Ordering::AcqRel) != next
    }

    fn store_ipv4(&self, next: Option<Ipv4Addr>) -> bool {
        let raw = next.map_or(0, Ipv4Addr::to_bits);
        self.ipv4.swap(raw, Ordering::AcqRel) != raw
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for ConnectivityHandle {
    fn default() -> Self {
        Self::new()
    }
}
