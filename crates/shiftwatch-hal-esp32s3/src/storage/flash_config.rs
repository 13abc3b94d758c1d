//! Flash-backed configuration store.
//!
//! The shift/asset configuration lives in the last 4 KiB sector of a
//! writable data partition, encoded by the core record codec.

use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use log::debug;
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use shiftwatch_core::{
    schedule::ShiftSchedule,
    settings::{
        ConfigStore,
        codec::{self, CodecError, RECORD_LEN},
    },
};

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashConfigError {
    PartitionTable,
    ConfigPartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    Corrupted,
    Unsupported,
}

impl From<CodecError> for FlashConfigError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Corrupted => Self::Corrupted,
        }
    }
}

/// Word-granular access over the ROM spiflash primitives.
#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashConfigError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashConfigError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashConfigError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashConfigError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashConfigError::Unsupported);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashConfigError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashConfigError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(())
    }

    /// Reads an arbitrary word-aligned-or-not span.
    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashConfigError> {
        if out.is_empty() {
            return Ok(());
        }

        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;
        let mut written = 0usize;

        for word_addr in (start..end).step_by(4) {
            let bytes = self.read_word(word_addr)?.to_le_bytes();
            let base = word_addr as i64 - addr as i64;

            for (i, b) in bytes.iter().enumerate() {
                let dst = base + i as i64;
                if dst < 0 {
                    continue;
                }
                let dst = dst as usize;
                if dst >= out.len() {
                    break;
                }
                out[dst] = *b;
                written += 1;
            }
        }

        if written == out.len() {
            Ok(())
        } else {
            Err(FlashConfigError::Corrupted)
        }
    }

    /// Writes into a previously erased span, padding partial words with
    /// the erased value.
    fn write_erased_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashConfigError> {
        if data.is_empty() {
            return Ok(());
        }

        let start = addr & !0b11;
        let end = (addr + data.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let mut bytes = [0xFFu8; 4];
            let base = word_addr as i64 - addr as i64;

            for (i, slot) in bytes.iter_mut().enumerate() {
                let src = base + i as i64;
                if src < 0 {
                    continue;
                }
                let src = src as usize;
                if src >= data.len() {
                    break;
                }
                *slot = data[src];
            }

            self.write_word(word_addr, u32::from_le_bytes(bytes))?;
        }

        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = FlashConfigError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashConfigError::Unsupported)
    }
}

/// [`ConfigStore`] over the last sector of a writable data partition.
#[derive(Debug)]
pub struct FlashConfigStore {
    flash: RawFlash,
    config_sector_addr: u32,
}

impl FlashConfigStore {
    pub fn new() -> Result<Self, FlashConfigError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashConfigError::PartitionTable)?;

        let mut undefined_data: Option<(u32, u32)> = None;
        let mut fallback_nvs: Option<(u32, u32)> = None;

        for entry in table.iter() {
            if entry.is_read_only() || entry.len() < FLASH_SECTOR_SIZE {
                continue;
            }

            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    undefined_data = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) => {
                    if fallback_nvs.is_none() {
                        fallback_nvs = Some((entry.offset(), entry.len()));
                    }
                }
                _ => {}
            }
        }

        let (offset, len) = undefined_data
            .or(fallback_nvs)
            .ok_or(FlashConfigError::ConfigPartitionMissing)?;

        if len < FLASH_SECTOR_SIZE {
            return Err(FlashConfigError::PartitionTooSmall);
        }

        let config_sector_addr = offset + len - FLASH_SECTOR_SIZE;
        debug!("config record sector at {:#x}", config_sector_addr);

        Ok(Self {
            flash,
            config_sector_addr,
        })
    }
}

impl ConfigStore for FlashConfigStore {
    type Error = FlashConfigError;

    fn load(&mut self) -> Result<Option<ShiftSchedule>, Self::Error> {
        let mut buf = [0u8; RECORD_LEN];
        self.flash.read_bytes(self.config_sector_addr, &mut buf)?;

        Ok(codec::decode(&buf)?)
    }

    fn save(&mut self, schedule: &ShiftSchedule) -> Result<(), Self::Error> {
        let mut buf = [0u8; RECORD_LEN];
        codec::encode(schedule, &mut buf);

        self.flash.erase_sector(self.config_sector_addr)?;
        self.flash
            .write_erased_bytes(self.config_sector_addr, &buf)
    }
}
