//! Flash page storage for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last 64KB of flash. One map item per EEPROM bank.
//!
//! Implements the `PageStorage` trait from `joybus-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use joybus_hal::storage::{StorageError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on a Pico
pub const SAVE_PARTITION_SIZE: usize = 64 * 1024; // 64KB for save data
pub const SAVE_PARTITION_START: usize = FLASH_SIZE - SAVE_PARTITION_SIZE;

/// Flash range for the save partition
pub const SAVE_RANGE: core::ops::Range<u32> =
    (SAVE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer for one bank plus item header
const ITEM_BUFFER_SIZE: usize = 512;

fn storage_error<E>(e: sequential_storage::Error<E>) -> StorageError {
    match e {
        sequential_storage::Error::Corrupted { .. } => StorageError::Corrupted,
        _ => StorageError::Storage,
    }
}

/// RP2040 flash-backed page storage
pub struct Rp2040PageStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040PageStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> joybus_hal::PageStorage for Rp2040PageStorage<'d> {
    async fn read_bank(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SAVE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(StorageError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(StorageError::NotFound),
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn write_bank(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            SAVE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(storage_error)
    }

    async fn erase_all(&mut self) -> Result<(), StorageError> {
        self.flash
            .erase(SAVE_RANGE.start, SAVE_RANGE.end)
            .await
            .map_err(|_| StorageError::Flash)
    }
}
