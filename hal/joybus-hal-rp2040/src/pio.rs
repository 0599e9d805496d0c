//! Joybus PIO program and clock math
//!
//! The line is open-drain: the output latch is held low and the program
//! drives the line by switching the pin direction. Output means low,
//! input lets the pull-up take the line high.
//!
//! # Bit encoding
//!
//! Every bit is 4 µs and starts with a falling edge:
//!
//! ```text
//! "0"  ▔▔╲___________╱▔▔▔    1 µs low, 2 µs low, 1 µs high
//! "1"  ▔▔╲___╱▔▔▔▔▔▔▔▔▔▔▔    1 µs low, 3 µs high
//! ```
//!
//! The program runs at 4 cycles per microsecond. On receive it samples
//! the line 2 µs after each falling edge. On transmit the CPU pushes each
//! byte inverted in the top 8 bits of the word (so a 0 bit drives the line)
//! with a "last byte" flag in bit 23; after the last byte the program sends
//! a 2 µs stop bit and returns to receiving on its own.

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// PIO clock: 4 cycles per microsecond
pub const JOYBUS_PIO_FREQ_HZ: u32 = 4_000_000;

/// Time one byte takes on the line
pub const BYTE_TIME_US: u32 = 8 * 4;

/// Length of the peripheral stop bit
pub const STOP_BIT_US: u32 = 2;

/// Bit in a TX word marking the last byte of a reply
pub const LAST_BYTE_FLAG: u32 = 1 << 23;

/// Calculate the PIO clock divider for a target frequency
///
/// Returns the raw bits of the 16.8 fixed-point divider.
pub fn calc_clock_divider(sys_clk_hz: u32, target_hz: u32) -> u32 {
    if target_hz == 0 {
        return 0xFFFF_FF; // Maximum divider = stopped
    }

    // To get 8-bit fractional precision, multiply by 256 first
    let divider_x256 = (sys_clk_hz as u64 * 256) / target_hz as u64;

    // Divider must be at least 1.0 and fit in 16.8
    divider_x256.clamp(256, 0xFFFF_FF) as u32
}

/// Encode one byte of a reply for the TX FIFO
pub fn encode_tx_word(byte: u8, last: bool) -> u32 {
    let flag = if last { LAST_BYTE_FLAG } else { 0 };
    ((!byte as u32) << 24) | flag
}

/// Extract the received byte from an RX FIFO word
///
/// The ISR shifts left with an 8-bit autopush, so the byte is in the low
/// bits.
pub fn decode_rx_word(word: u32) -> u8 {
    word as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_divider() {
        // 125 MHz / 4 MHz = 31.25
        let bits = calc_clock_divider(SYS_CLK_HZ, JOYBUS_PIO_FREQ_HZ);
        assert_eq!(bits >> 8, 31);
        assert_eq!(bits & 0xFF, 64);

        // 133 MHz overclock / 4 MHz = 33.25
        let bits = calc_clock_divider(133_000_000, JOYBUS_PIO_FREQ_HZ);
        assert_eq!(bits >> 8, 33);
        assert_eq!(bits & 0xFF, 64);
    }

    #[test]
    fn test_clock_divider_clamped() {
        assert_eq!(calc_clock_divider(1_000, JOYBUS_PIO_FREQ_HZ), 256);
        assert_eq!(calc_clock_divider(SYS_CLK_HZ, 0), 0xFFFF_FF);
    }

    #[test]
    fn test_tx_word() {
        assert_eq!(encode_tx_word(0x00, false), 0xFF00_0000);
        assert_eq!(encode_tx_word(0xFF, true), LAST_BYTE_FLAG);
        assert_eq!(encode_tx_word(0x80, true) >> 24, 0x7F);
    }

    #[test]
    fn test_tx_tail_covers_last_byte_and_stop_bit() {
        // One byte is 8 bits of 4 µs, then a 2 µs stop bit
        assert_eq!(BYTE_TIME_US + STOP_BIT_US, 34);
    }

    #[test]
    fn test_rx_word() {
        assert_eq!(decode_rx_word(0x0000_00C0), 0xC0);
        assert_eq!(decode_rx_word(0xFFFF_FF05), 0x05);
    }
}
