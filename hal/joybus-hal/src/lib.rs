//! Joybus Hardware Abstraction Layer
//!
//! This crate defines the traits a peripheral emulator needs from the chip
//! it runs on. Chip-specific HALs implement them; the protocol crates only
//! ever see the traits, so they can be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (joybus-eeprom-firmware)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  joybus-eeprom (protocol engine)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  joybus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  joybus-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transceiver::JoybusTransceiver`] - Byte-level single-wire bus access
//! - [`clock::Monotonic`] - Microsecond timestamps and busy-waiting
//! - [`storage::PageStorage`] - Persistent storage for EEPROM contents

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod port;
pub mod storage;
pub mod transceiver;

// Re-export key traits at crate root for convenience
pub use clock::Monotonic;
pub use port::ProgramSlot;
pub use storage::{PageStorage, StorageError, StorageKey};
pub use transceiver::{BusError, JoybusTransceiver};
