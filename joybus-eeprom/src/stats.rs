//! Bus traffic counters
//!
//! Bad frames never reach the application, so these counters are the only
//! place they show up. Unknown command bytes, command bytes that fail to
//! decode and frames cut short by a receive failure take the same recovery
//! path but are counted apart.

/// Counters kept by the engine
///
/// All counters wrap on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusStats {
    /// PROBE and RESET commands answered
    pub probes: u32,
    /// READ commands handed to the application
    pub reads: u32,
    /// WRITE commands handed to the application
    pub writes: u32,
    /// Command bytes this device does not implement
    pub unknown_commands: u32,
    /// READ/WRITE frames whose arguments did not fully arrive
    pub truncated_frames: u32,
    /// Command bytes that did not decode on the line
    pub malformed_frames: u32,
    /// Receive windows that passed without a command byte
    pub idle_polls: u32,
}

impl BusStats {
    /// Total number of resynchronizations performed
    pub fn resyncs(&self) -> u32 {
        self.unknown_commands
            .wrapping_add(self.truncated_frames)
            .wrapping_add(self.malformed_frames)
    }

    /// Total number of commands recognized and served
    pub fn served(&self) -> u32 {
        self.probes
            .wrapping_add(self.reads)
            .wrapping_add(self.writes)
    }
}

pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}
