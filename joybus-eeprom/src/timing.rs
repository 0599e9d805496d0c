//! Bus timing constants
//!
//! Every timeout the engine uses is derived from the length of one incoming
//! bit, so retuning the bus model means changing one number.

/// Length of one incoming bit in microseconds
pub const INCOMING_BIT_LENGTH_US: u32 = 5;

/// Longest command this device has to skip over when resynchronizing
pub const MAX_COMMAND_BYTES: u32 = 1;

/// Derived timeouts, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// Length of one incoming bit
    pub bit_length_us: u32,
    /// Per-byte receive timeout
    pub receive_timeout_us: u32,
    /// Settle time before resetting the transceiver after a bad frame
    pub reset_wait_us: u32,
    /// Minimum gap between the host's last byte and our reply
    pub reply_delay_us: u32,
}

impl BusTiming {
    /// Timing used by real consoles
    pub const DEFAULT: BusTiming = BusTiming::from_bit_length(INCOMING_BIT_LENGTH_US);

    /// Derive all timeouts from the incoming bit length
    pub const fn from_bit_length(bit_length_us: u32) -> Self {
        let receive_timeout_us = bit_length_us * 10;
        Self {
            bit_length_us,
            receive_timeout_us,
            reset_wait_us: (bit_length_us * 8) * (MAX_COMMAND_BYTES - 1) + receive_timeout_us,
            // Stop bit settle plus two bit times of margin
            reply_delay_us: bit_length_us - 1 + 2,
        }
    }
}

impl Default for BusTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let timing = BusTiming::default();
        assert_eq!(timing.bit_length_us, 5);
        assert_eq!(timing.receive_timeout_us, 50);
        assert_eq!(timing.reset_wait_us, 50);
        assert_eq!(timing.reply_delay_us, 6);
    }

    #[test]
    fn test_derived_from_bit_length() {
        let timing = BusTiming::from_bit_length(4);
        assert_eq!(timing.receive_timeout_us, 40);
        assert_eq!(timing.reset_wait_us, 40);
        assert_eq!(timing.reply_delay_us, 5);
    }
}
