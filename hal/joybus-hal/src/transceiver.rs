//! Single-wire bus transceiver abstraction
//!
//! The transceiver owns the line-level bit timing. Everything above it
//! deals in whole bytes.

/// Errors from a byte-level receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// No byte arrived within the timeout
    Timeout,
    /// The line carried something that did not decode as a byte
    Framing,
}

/// Half-duplex, single-wire Joybus transceiver
///
/// An implementation is an exclusively owned hardware binding: it is
/// created by a fallible constructor and released when dropped.
pub trait JoybusTransceiver {
    /// Receive exactly `buf.len()` bytes
    ///
    /// Each byte must arrive within `timeout_us` microseconds of the
    /// previous one (or of the call, for the first byte).
    ///
    /// # Returns
    /// The number of bytes received, or the error that stopped reception.
    fn receive(&mut self, buf: &mut [u8], timeout_us: u32) -> Result<usize, BusError>;

    /// Transmit `data` verbatim, followed by the peripheral stop bit
    ///
    /// Blocks until the stop bit has been driven, so the port can be
    /// reset or dropped right after without cutting the reply short.
    fn send(&mut self, data: &[u8]);

    /// Force the line back to idle/listening, discarding any partial frame
    fn reset(&mut self);

    /// Instruction memory offset the transceiver program was installed at
    fn offset(&self) -> u8;

    /// Receive a single byte
    #[inline(always)]
    fn receive_byte(&mut self, timeout_us: u32) -> Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.receive(&mut buf, timeout_us)?;
        Ok(buf[0])
    }
}
