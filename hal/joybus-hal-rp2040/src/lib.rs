//! RP2040-specific HAL for Joybus peripheral emulation
//!
//! This crate provides RP2040 implementations of the `joybus-hal` traits:
//!
//! - PIO-based Joybus transceiver (implements `joybus_hal::JoybusTransceiver`)
//! - Microsecond clock on the timer peripheral (implements `joybus_hal::Monotonic`)
//! - Flash page storage (implements `joybus_hal::PageStorage`)

#![no_std]

pub mod clock;
pub mod flash;
pub mod pio;
pub mod transceiver;

pub use clock::TimerClock;
pub use flash::Rp2040PageStorage;
pub use transceiver::{JoybusProgram, PioJoybusPort, PortError};

// Re-export shared traits from joybus-hal for convenience
pub use joybus_hal::{JoybusTransceiver, Monotonic, PageStorage, ProgramSlot, StorageKey};
