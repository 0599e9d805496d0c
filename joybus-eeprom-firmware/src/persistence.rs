//! EEPROM contents persistence
//!
//! Loads the RAM image from flash at boot and writes changed banks back.
//! Missing banks are left erased, which is what a fresh cartridge holds. A
//! corrupted partition is wiped and the device starts out blank.

use defmt::*;
use heapless::Vec;

use joybus_eeprom::image::MAX_BANKS;
use joybus_eeprom::{EepromImage, BANK_SIZE};
use joybus_hal::{PageStorage, StorageError, StorageKey};

/// Fill `image` from storage
///
/// Returns the number of banks restored.
pub async fn load<S: PageStorage>(storage: &mut S, image: &mut EepromImage) -> usize {
    info!("Loading save data from flash...");

    let mut buffer = [0u8; BANK_SIZE];
    let mut restored = 0;

    for index in 0..image.bank_count() {
        let Some(key) = StorageKey::bank(index as u8) else {
            break;
        };

        match storage.read_bank(key, &mut buffer).await {
            Ok(len) => {
                image.load_bank(index, &buffer[..len]);
                restored += 1;
            }
            Err(StorageError::NotFound) => {
                debug!("Bank {} not in flash, leaving erased", index);
            }
            Err(StorageError::Corrupted) => {
                warn!("Save partition corrupted, erasing");
                if let Err(e) = storage.erase_all().await {
                    warn!("Failed to erase save partition: {:?}", e);
                }
                *image = EepromImage::new(image.kind());
                return 0;
            }
            Err(e) => {
                warn!("Failed to read bank {}: {:?}", index, e);
            }
        }
    }

    info!("Restored {}/{} banks", restored, image.bank_count());
    restored
}

/// Write every dirty bank back to storage
///
/// Banks that fail to write stay dirty and are retried on the next flush.
pub async fn flush<S: PageStorage>(storage: &mut S, image: &mut EepromImage) {
    let dirty: Vec<usize, MAX_BANKS> = image.dirty_banks().collect();

    for index in dirty {
        let (Some(key), Some(bytes)) = (StorageKey::bank(index as u8), image.bank(index)) else {
            continue;
        };

        match storage.write_bank(key, bytes).await {
            Ok(()) => {
                image.mark_clean(index);
                debug!("Flushed bank {}", index);
            }
            Err(e) => {
                warn!("Failed to write bank {}: {:?}", index, e);
            }
        }
    }
}
