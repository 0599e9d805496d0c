//! Device identity status
//!
//! PROBE and RESET are answered with a three byte status: a 16-bit device
//! identifier (little-endian on the wire) and a status byte. The
//! identifier is what tells the console how large the EEPROM is.

use crate::operation::PAGE_SIZE;

/// Device identifier of a 4 Kbit EEPROM
pub const DEVICE_ID_4K: u16 = 0x8000;

/// Device identifier of a 16 Kbit EEPROM
pub const DEVICE_ID_16K: u16 = 0xC000;

/// Size of the identity status reply in bytes
pub const STATUS_LEN: usize = 3;

/// Supported EEPROM capacities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromType {
    /// 4 Kbit, 64 pages
    Eeprom4k,
    /// 16 Kbit, 256 pages
    Eeprom16k,
}

impl EepromType {
    /// Device identifier reported on discovery
    pub fn device_id(self) -> u16 {
        match self {
            EepromType::Eeprom4k => DEVICE_ID_4K,
            EepromType::Eeprom16k => DEVICE_ID_16K,
        }
    }

    /// Number of addressable pages
    pub fn page_count(self) -> usize {
        match self {
            EepromType::Eeprom4k => 64,
            EepromType::Eeprom16k => 256,
        }
    }

    /// Total capacity in bytes
    pub fn capacity_bytes(self) -> usize {
        self.page_count() * PAGE_SIZE
    }

    /// Identity status sent on discovery
    pub fn status(self) -> DeviceStatus {
        DeviceStatus::new(self.device_id(), 0x00)
    }
}

/// Identity status payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus([u8; STATUS_LEN]);

impl DeviceStatus {
    /// Build a status from a device identifier and status byte
    pub const fn new(device: u16, status: u8) -> Self {
        let id = device.to_le_bytes();
        Self([id[0], id[1], status])
    }

    /// Device identifier
    pub fn device(&self) -> u16 {
        u16::from_le_bytes([self.0[0], self.0[1]])
    }

    /// Trailing status byte
    pub fn status(&self) -> u8 {
        self.0[2]
    }

    /// Wire encoding
    pub fn as_bytes(&self) -> &[u8; STATUS_LEN] {
        &self.0
    }
}
