//! RAM copy of the EEPROM contents
//!
//! The engine has no opinion on storage. Firmware that wants a working
//! save device keeps the whole chip in RAM, answers reads and writes from
//! it, and persists it in [`BANK_SIZE`] chunks when the bus is quiet.

use core::ops::Deref;

use heapless::Vec;

use crate::command::Command;
use crate::operation::{Operation, PAGE_SIZE, WRITE_ACK};
use crate::status::EepromType;

/// Largest supported capacity in bytes
pub const MAX_CAPACITY: usize = 2048;

/// Bytes per persistence bank (32 pages)
pub const BANK_SIZE: usize = 256;

/// Number of banks in the largest supported capacity
pub const MAX_BANKS: usize = MAX_CAPACITY / BANK_SIZE;

/// Value of an erased EEPROM cell
pub const ERASED: u8 = 0xFF;

/// Bytes to send back for an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply(Vec<u8, PAGE_SIZE>);

impl Deref for Reply {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Whole-device contents plus dirty tracking
#[derive(Debug, Clone)]
pub struct EepromImage {
    kind: EepromType,
    data: [u8; MAX_CAPACITY],
    /// One bit per bank
    dirty: u8,
}

impl EepromImage {
    /// Erased image for `kind`
    pub fn new(kind: EepromType) -> Self {
        Self {
            kind,
            data: [ERASED; MAX_CAPACITY],
            dirty: 0,
        }
    }

    /// EEPROM type this image models
    pub fn kind(&self) -> EepromType {
        self.kind
    }

    /// Number of banks this image persists as
    pub fn bank_count(&self) -> usize {
        self.kind.capacity_bytes().div_ceil(BANK_SIZE)
    }

    /// Contents of the device, limited to its capacity
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.kind.capacity_bytes()]
    }

    // A smaller chip ignores the high address bits. Page counts are
    // powers of two, so masking avoids a division on cores without one.
    #[inline(always)]
    fn page_offset(&self, page: u8) -> usize {
        (page as usize & (self.kind.page_count() - 1)) * PAGE_SIZE
    }

    /// Read one page
    #[inline(always)]
    pub fn read_page(&self, page: u8) -> [u8; PAGE_SIZE] {
        let offset = self.page_offset(page);
        let mut out = [0u8; PAGE_SIZE];
        out.copy_from_slice(&self.data[offset..offset + PAGE_SIZE]);
        out
    }

    /// Write one page and mark its bank dirty
    #[inline(always)]
    pub fn write_page(&mut self, page: u8, data: &[u8; PAGE_SIZE]) {
        let offset = self.page_offset(page);
        self.data[offset..offset + PAGE_SIZE].copy_from_slice(data);
        self.dirty |= 1 << (offset / BANK_SIZE);
    }

    /// Apply an operation and produce the reply the host expects
    ///
    /// Reads reply with the page contents, writes with [`WRITE_ACK`].
    /// Anything else gets an empty reply.
    #[inline(always)]
    pub fn serve(&mut self, op: &Operation) -> Reply {
        let mut reply = Vec::new();
        match op.command {
            Command::Read => {
                // Capacity is exactly one page
                let _ = reply.extend_from_slice(&self.read_page(op.page));
            }
            Command::Write => {
                self.write_page(op.page, &op.data);
                let _ = reply.extend_from_slice(&WRITE_ACK);
            }
            _ => {}
        }
        Reply(reply)
    }

    /// Returns true if any bank changed since it was last marked clean
    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Indices of banks changed since they were last marked clean
    pub fn dirty_banks(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bank_count()).filter(move |&i| self.dirty & (1 << i) != 0)
    }

    /// Mark a bank as persisted
    pub fn mark_clean(&mut self, index: usize) {
        if index < MAX_BANKS {
            self.dirty &= !(1 << index);
        }
    }

    /// Bytes of bank `index`
    ///
    /// Returns `None` past the end of the device.
    pub fn bank(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(BANK_SIZE)?;
        let end = (start + BANK_SIZE).min(self.kind.capacity_bytes());
        (start < end).then(|| &self.data[start..end])
    }

    /// Overwrite bank `index` with persisted bytes
    ///
    /// Copies as much of `bytes` as fits. The bank is left clean. Returns
    /// the number of bytes copied.
    pub fn load_bank(&mut self, index: usize, bytes: &[u8]) -> usize {
        let start = match index.checked_mul(BANK_SIZE) {
            Some(start) if start < self.kind.capacity_bytes() => start,
            _ => return 0,
        };
        let end = (start + BANK_SIZE).min(self.kind.capacity_bytes());
        let len = bytes.len().min(end - start);
        self.data[start..start + len].copy_from_slice(&bytes[..len]);
        self.mark_clean(index);
        len
    }
}
