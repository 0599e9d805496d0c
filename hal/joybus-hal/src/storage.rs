//! Persistent page storage abstractions
//!
//! EEPROM contents are persisted in fixed-size banks rather than page by
//! page, so a flush after a burst of writes touches few flash records.

/// Number of bank keys available
pub const MAX_BANKS: u8 = 8;

/// Key identifying one bank of EEPROM contents in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageKey(u8);

impl StorageKey {
    /// Key for bank `index`
    ///
    /// Returns `None` past [`MAX_BANKS`].
    pub fn bank(index: u8) -> Option<Self> {
        (index < MAX_BANKS).then_some(StorageKey(index))
    }

    /// Bank index this key refers to
    pub fn index(self) -> u8 {
        self.0
    }

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::bank(value)
    }
}

/// Errors from page storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Stored records are damaged; the partition must be erased
    Corrupted,
}

/// Bank-addressed persistent storage
///
/// Implementations should handle wear leveling and data integrity.
pub trait PageStorage {
    /// Read a bank into `buffer`
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read_bank(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StorageError>>;

    /// Write a bank
    fn write_bank(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Erase every stored bank
    ///
    /// Used to recover from [`StorageError::Corrupted`].
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), StorageError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_key_range() {
        assert_eq!(StorageKey::bank(0).map(StorageKey::index), Some(0));
        assert_eq!(StorageKey::bank(MAX_BANKS - 1).map(StorageKey::index), Some(MAX_BANKS - 1));
        assert!(StorageKey::bank(MAX_BANKS).is_none());
        assert!(StorageKey::from_u8(0xFF).is_none());
    }
}
