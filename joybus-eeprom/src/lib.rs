//! Joybus EEPROM save device emulation
//!
//! This crate emulates the EEPROM chip a cartridge exposes on the console's
//! controller bus. The console talks to it over a single-wire, half-duplex
//! line; the emulator listens for commands, answers device discovery on
//! its own, and hands addressed page reads and writes to the application.
//!
//! # Protocol Overview
//!
//! ```text
//! PROBE / RESET   host: [cmd]                      device: [status; 3]
//! READ            host: [0x04][page]               device: [data; 8]
//! WRITE           host: [0x05][page][data; 8]      device: [ack]
//! ```
//!
//! Every device reply must start no earlier than the reply delay after the
//! host's last byte, otherwise it collides with the host's stop bit.
//!
//! # Usage
//!
//! ```ignore
//! let mut eeprom = Eeprom::new(EepromType::Eeprom4k, port, clock);
//! let mut image = EepromImage::new(EepromType::Eeprom4k);
//! loop {
//!     let op = eeprom.wait_for_command();
//!     let reply = image.serve(&op);
//!     eeprom.send_data(&reply);
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod engine;
pub mod image;
pub mod operation;
pub mod stats;
pub mod status;
pub mod timing;

#[cfg(test)]
mod mock;

pub use command::Command;
pub use engine::Eeprom;
pub use image::{EepromImage, Reply, BANK_SIZE};
pub use operation::{Operation, PAGE_SIZE, WRITE_ACK};
pub use stats::BusStats;
pub use status::{DeviceStatus, EepromType};
pub use timing::BusTiming;
