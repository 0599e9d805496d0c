//! Build-time configuration
//!
//! Generated by build.rs from eeprom.toml:
//!
//! - `EEPROM_TYPE` - EEPROM variant reported to the console
//! - `PERSIST` - Whether changed pages are written back to flash
//! - `FLUSH_IDLE_MS` - Bus quiet time before a flush

use joybus_eeprom::EepromType;

include!(concat!(env!("OUT_DIR"), "/config.rs"));
