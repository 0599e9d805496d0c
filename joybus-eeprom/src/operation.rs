//! Addressed operations handed to the application

use crate::command::Command;

/// Bytes per EEPROM page
pub const PAGE_SIZE: usize = 8;

/// Reply a real EEPROM sends once a page write has been accepted
pub const WRITE_ACK: [u8; 1] = [0x00];

/// A page read or write requested by the host
///
/// Fields follow the order they arrive in on the wire: command, page,
/// payload. Every field is byte-aligned, so the layout has no padding.
/// The struct is one byte longer than the frame, since [`Command`] keeps
/// the raw byte of unknown commands next to its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct Operation {
    /// [`Command::Read`] or [`Command::Write`]
    pub command: Command,
    /// Page index as sent by the host
    pub page: u8,
    /// Page payload; zero for reads
    pub data: [u8; PAGE_SIZE],
}

impl Operation {
    /// A page read
    pub fn read(page: u8) -> Self {
        Self {
            command: Command::Read,
            page,
            data: [0; PAGE_SIZE],
        }
    }

    /// A page write carrying `data`
    pub fn write(page: u8, data: [u8; PAGE_SIZE]) -> Self {
        Self {
            command: Command::Write,
            page,
            data,
        }
    }

    /// Returns true for a page read
    pub fn is_read(&self) -> bool {
        self.command == Command::Read
    }

    /// Returns true for a page write
    pub fn is_write(&self) -> bool {
        self.command == Command::Write
    }

    /// Byte offset of the page within the device
    pub fn address(&self) -> usize {
        self.page as usize * PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_has_no_data() {
        let op = Operation::read(3);
        assert!(op.is_read());
        assert_eq!(op.page, 3);
        assert_eq!(op.data, [0; PAGE_SIZE]);
    }

    #[test]
    fn test_write_keeps_byte_order() {
        let op = Operation::write(0x3F, [8, 7, 6, 5, 4, 3, 2, 1]);
        assert!(op.is_write());
        assert_eq!(op.data, [8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(op.address(), 0x3F * 8);
    }

    #[test]
    fn test_layout_unpadded() {
        assert_eq!(core::mem::align_of::<Operation>(), 1);
        assert_eq!(
            core::mem::size_of::<Operation>(),
            core::mem::size_of::<Command>() + 1 + PAGE_SIZE
        );
        // Tag plus the byte kept for unknown commands
        assert_eq!(core::mem::size_of::<Command>(), 2);
    }
}
