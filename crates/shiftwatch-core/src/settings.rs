//! Persisted configuration abstraction and its record codec.

use crate::schedule::ShiftSchedule;

/// Abstract persistence backend for the shift/asset configuration.
pub trait ConfigStore {
    type Error;

    fn load(&mut self) -> Result<Option<ShiftSchedule>, Self::Error>;
    fn save(&mut self, schedule: &ShiftSchedule) -> Result<(), Self::Error>;
}

pub mod codec {
    //! Versioned binary record for the configuration blob.
    //!
    //! Kept free of storage concerns so the format is host-testable; the
    //! flash store is a thin wrapper around [`encode`]/[`decode`].

    use crate::schedule::{
        ASSET_NAME_BYTES, MAX_ASSETS, MAX_CONFIGURABLE_SHIFTS, ShiftSchedule, ShiftTime,
        ShiftWindow,
    };

    pub const RECORD_MAGIC: u32 = u32::from_le_bytes(*b"SWC1");
    pub const RECORD_VERSION: u8 = 1;

    const HEADER_LEN: usize = 4 + 1 + 1;
    const SLOT_LEN: usize = 5;
    const ASSET_LEN: usize = 1 + ASSET_NAME_BYTES + MAX_CONFIGURABLE_SHIFTS * SLOT_LEN;
    const CHECKSUM_LEN: usize = 4;

    /// Fixed size of an encoded configuration record.
    pub const RECORD_LEN: usize = HEADER_LEN + MAX_ASSETS * ASSET_LEN + CHECKSUM_LEN;

    const SLOT_FLAG_CONFIGURED: u8 = 0x01;
    const SLOT_FLAG_HAS_END: u8 = 0x02;

    /// Record decoding failures.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CodecError {
        /// Magic matched but the payload is damaged.
        Corrupted,
    }

    /// Serializes `schedule` into a fixed-size record.
    pub fn encode(schedule: &ShiftSchedule, out: &mut [u8; RECORD_LEN]) {
        out.fill(0);
        out[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        out[4] = RECORD_VERSION;
        out[5] = MAX_ASSETS as u8;

        for asset in 0..MAX_ASSETS {
            let base = HEADER_LEN + asset * ASSET_LEN;
            let Ok(config) = schedule.asset(asset) else {
                continue;
            };

            let name = config.name().as_bytes();
            out[base] = name.len() as u8;
            out[base + 1..base + 1 + name.len()].copy_from_slice(name);

            for slot in 0..MAX_CONFIGURABLE_SHIFTS {
                let slot_base = base + 1 + ASSET_NAME_BYTES + slot * SLOT_LEN;
                let Ok(Some(window)) = schedule.get_shift(asset, slot) else {
                    continue;
                };

                let mut flags = SLOT_FLAG_CONFIGURED;
                out[slot_base + 1] = window.start.hour();
                out[slot_base + 2] = window.start.minute();
                if let Some(end) = window.end {
                    flags |= SLOT_FLAG_HAS_END;
                    out[slot_base + 3] = end.hour();
                    out[slot_base + 4] = end.minute();
                }
                out[slot_base] = flags;
            }
        }

        let checksum = checksum32(&out[..RECORD_LEN - CHECKSUM_LEN]);
        out[RECORD_LEN - CHECKSUM_LEN..].copy_from_slice(&checksum.to_le_bytes());
    }

    /// Deserializes a record.
    ///
    /// `Ok(None)` means "nothing stored here" (erased flash or foreign
    /// magic); `Err(Corrupted)` means a record that claims to be ours but
    /// fails validation.
    pub fn decode(buf: &[u8; RECORD_LEN]) -> Result<Option<ShiftSchedule>, CodecError> {
        if buf.iter().all(|b| *b == 0xFF) {
            return Ok(None);
        }

        let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if magic != RECORD_MAGIC {
            return Ok(None);
        }

        if buf[4] != RECORD_VERSION || buf[5] as usize != MAX_ASSETS {
            return Err(CodecError::Corrupted);
        }

        let expected = u32::from_le_bytes([
            buf[RECORD_LEN - 4],
            buf[RECORD_LEN - 3],
            buf[RECORD_LEN - 2],
            buf[RECORD_LEN - 1],
        ]);
        if checksum32(&buf[..RECORD_LEN - CHECKSUM_LEN]) != expected {
            return Err(CodecError::Corrupted);
        }

        let mut schedule = ShiftSchedule::new();

        for asset in 0..MAX_ASSETS {
            let base = HEADER_LEN + asset * ASSET_LEN;

            let name_len = buf[base] as usize;
            if name_len > ASSET_NAME_BYTES {
                return Err(CodecError::Corrupted);
            }
            if name_len > 0 {
                let name = core::str::from_utf8(&buf[base + 1..base + 1 + name_len])
                    .map_err(|_| CodecError::Corrupted)?;
                schedule
                    .set_asset_name(asset, name)
                    .map_err(|_| CodecError::Corrupted)?;
            }

            for slot in 0..MAX_CONFIGURABLE_SHIFTS {
                let slot_base = base + 1 + ASSET_NAME_BYTES + slot * SLOT_LEN;
                let flags = buf[slot_base];
                if flags & SLOT_FLAG_CONFIGURED == 0 {
                    continue;
                }

                let start = ShiftTime::new(buf[slot_base + 1], buf[slot_base + 2])
                    .map_err(|_| CodecError::Corrupted)?;
                let window = if flags & SLOT_FLAG_HAS_END != 0 {
                    let end = ShiftTime::new(buf[slot_base + 3], buf[slot_base + 4])
                        .map_err(|_| CodecError::Corrupted)?;
                    ShiftWindow::spanning(start, end)
                } else {
                    ShiftWindow::starting_at(start)
                };

                schedule
                    .set_shift_window(asset, slot, window)
                    .map_err(|_| CodecError::Corrupted)?;
            }
        }

        Ok(Some(schedule))
    }

    fn checksum32(bytes: &[u8]) -> u32 {
        let mut hash = 0x811C_9DC5u32;
        for b in bytes {
            hash ^= *b as u32;
            hash = hash.wrapping_mul(16_777_619);
        }
        hash
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn sample_schedule() -> ShiftSchedule {
            let mut schedule = ShiftSchedule::new();
            schedule.set_asset_name(0, "Press").unwrap();
            schedule.set_asset_name(4, "Lathe 2").unwrap();
            schedule.set_shift_span(0, 0, "06:00", "14:00").unwrap();
            schedule.set_shift_span(0, 1, "14:00", "22:00").unwrap();
            schedule.set_shift(4, 3, "22:00").unwrap();
            schedule
        }

        #[test]
        fn encode_decode_round_trips() {
            let schedule = sample_schedule();
            let mut buf = [0u8; RECORD_LEN];
            encode(&schedule, &mut buf);

            assert_eq!(decode(&buf), Ok(Some(schedule)));
        }

        #[test]
        fn erased_flash_reads_as_nothing_stored() {
            let buf = [0xFFu8; RECORD_LEN];
            assert_eq!(decode(&buf), Ok(None));
        }

        #[test]
        fn foreign_magic_reads_as_nothing_stored() {
            let mut buf = [0u8; RECORD_LEN];
            encode(&sample_schedule(), &mut buf);
            buf[0] ^= 0xA5;

            assert_eq!(decode(&buf), Ok(None));
        }

        #[test]
        fn flipped_payload_bit_is_reported_corrupted() {
            let mut buf = [0u8; RECORD_LEN];
            encode(&sample_schedule(), &mut buf);
            buf[RECORD_LEN / 2] ^= 0x01;

            assert_eq!(decode(&buf), Err(CodecError::Corrupted));
        }

        #[test]
        fn invalid_stored_time_is_reported_corrupted() {
            let mut buf = [0u8; RECORD_LEN];
            encode(&sample_schedule(), &mut buf);

            // First slot of asset 0: corrupt the start hour and re-seal.
            buf[4 + 1 + 1 + 1 + ASSET_NAME_BYTES + 1] = 99;
            let checksum = checksum32(&buf[..RECORD_LEN - 4]);
            buf[RECORD_LEN - 4..].copy_from_slice(&checksum.to_le_bytes());

            assert_eq!(decode(&buf), Err(CodecError::Corrupted));
        }
    }
}
