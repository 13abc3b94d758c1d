use shiftwatch_core::{schedule::ShiftSchedule, settings::ConfigStore};
use shiftwatch_hal_esp32s3::storage::flash_config::FlashConfigStore;

use super::CONFIG_SAVE_DEBOUNCE_MS;

/// Debounces schedule changes into flash so a provisioning burst costs
/// one erase cycle instead of one per field.
pub(super) struct ConfigSyncState {
    last_saved: ShiftSchedule,
    pending: Option<(ShiftSchedule, u64)>,
}

impl ConfigSyncState {
    pub(super) fn new(initial: ShiftSchedule) -> Self {
        Self {
            last_saved: initial,
            pending: None,
        }
    }

    pub(super) fn track_current(&mut self, current: &ShiftSchedule, now_ms: u64) {
        if *current == self.last_saved {
            return;
        }

        match self.pending.as_mut() {
            Some((pending, changed_at_ms)) => {
                if pending != current {
                    *pending = current.clone();
                    *changed_at_ms = now_ms;
                }
            }
            None => {
                self.pending = Some((current.clone(), now_ms));
            }
        }
    }

    pub(super) fn flush_if_due(&mut self, store: Option<&mut FlashConfigStore>, now_ms: u64) {
        let Some((candidate, changed_at_ms)) = self.pending.as_ref() else {
            return;
        };

        if now_ms.saturating_sub(*changed_at_ms) < CONFIG_SAVE_DEBOUNCE_MS {
            return;
        }

        let candidate = candidate.clone();
        match store {
            Some(store) => {
                if store.save(&candidate).is_ok() {
                    self.last_saved = candidate;
                    self.pending = None;
                } else {
                    // Keep the pending change and retry later if flash is
                    // temporarily unavailable.
                    self.pending = Some((candidate, now_ms));
                }
            }
            None => {
                self.last_saved = candidate;
                self.pending = None;
            }
        }
    }
}
