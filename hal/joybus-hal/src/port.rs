//! Transceiver resource selection

/// Where to install the transceiver program
///
/// Several ports on the same PIO block can share one installed program;
/// the first port loads it with `Auto` and the rest reuse its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramSlot {
    /// Let the allocator pick a free region
    #[default]
    Auto,
    /// Install at this instruction offset
    At(u8),
}

impl ProgramSlot {
    /// Requested offset, if any
    pub fn offset(self) -> Option<u8> {
        match self {
            ProgramSlot::Auto => None,
            ProgramSlot::At(offset) => Some(offset),
        }
    }
}
