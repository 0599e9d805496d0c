//! Monotonic clock on the RP2040 timer
//!
//! Reads the free-running 1 MHz timer registers directly. This is the same
//! counter the embassy time driver uses, but reading it is inlined into
//! the caller instead of going through the driver.

use embassy_rp::pac;
use joybus_hal::Monotonic;

/// Microsecond clock backed by the RP2040 timer peripheral
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerClock;

impl Monotonic for TimerClock {
    #[inline(always)]
    fn now_us(&self) -> u64 {
        // The high word can tick between the two reads
        loop {
            let hi = pac::TIMER.timerawh().read();
            let lo = pac::TIMER.timerawl().read();
            if pac::TIMER.timerawh().read() == hi {
                return ((hi as u64) << 32) | lo as u64;
            }
        }
    }
}
