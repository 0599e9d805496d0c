//! Command bytes sent by the host
//!
//! The first byte of every host transaction selects the command. The byte
//! values are fixed by the bus and shared with every console.

// Wire format values
pub const CMD_PROBE: u8 = 0x00;
pub const CMD_READ: u8 = 0x04;
pub const CMD_WRITE: u8 = 0x05;
pub const CMD_RESET: u8 = 0xFF;

/// Host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Reset the device; answered with the identity status
    Reset,
    /// Device discovery; answered with the identity status
    Probe,
    /// Read one page
    Read,
    /// Write one page
    Write,
    /// Any byte this device does not implement
    Unknown(u8),
}

impl Command {
    /// Parse a command from its wire format byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            CMD_RESET => Command::Reset,
            CMD_PROBE => Command::Probe,
            CMD_READ => Command::Read,
            CMD_WRITE => Command::Write,
            other => Command::Unknown(other),
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Reset => CMD_RESET,
            Command::Probe => CMD_PROBE,
            Command::Read => CMD_READ,
            Command::Write => CMD_WRITE,
            Command::Unknown(byte) => byte,
        }
    }

    /// Number of bytes the host sends after the command byte
    ///
    /// `None` for unknown commands, whose length cannot be known.
    pub fn argument_len(self) -> Option<usize> {
        match self {
            Command::Reset | Command::Probe => Some(0),
            Command::Read => Some(1),
            Command::Write => Some(1 + crate::operation::PAGE_SIZE),
            Command::Unknown(_) => None,
        }
    }

    /// Returns true for commands the engine answers by itself
    pub fn is_discovery(self) -> bool {
        matches!(self, Command::Reset | Command::Probe)
    }
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        Command::from_byte(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_bytes() {
        assert_eq!(Command::from_byte(0x00), Command::Probe);
        assert_eq!(Command::from_byte(0xFF), Command::Reset);
        assert_eq!(Command::from_byte(0x04), Command::Read);
        assert_eq!(Command::from_byte(0x05), Command::Write);
    }

    #[test]
    fn test_unknown_keeps_byte() {
        // Controller status and pak commands are not ours
        assert_eq!(Command::from_byte(0x01), Command::Unknown(0x01));
        assert_eq!(Command::from_byte(0x02), Command::Unknown(0x02));
        assert_eq!(Command::Unknown(0x41).to_byte(), 0x41);
    }

    #[test]
    fn test_argument_len() {
        assert_eq!(Command::Probe.argument_len(), Some(0));
        assert_eq!(Command::Read.argument_len(), Some(1));
        assert_eq!(Command::Write.argument_len(), Some(9));
        assert_eq!(Command::Unknown(0x13).argument_len(), None);
    }

    #[test]
    fn test_classification() {
        assert!(Command::Reset.is_discovery());
        assert!(Command::Probe.is_discovery());
        assert!(!Command::Read.is_discovery());
        assert!(!Command::Write.is_discovery());
        assert!(!Command::Unknown(0x10).is_discovery());
    }

    proptest::proptest! {
        #[test]
        fn test_byte_roundtrip(byte: u8) {
            proptest::prop_assert_eq!(Command::from_byte(byte).to_byte(), byte);
        }
    }
}
