//! Command state machine and reply timing guard
//!
//! [`Eeprom`] owns the transceiver and drives the bus side of the device:
//!
//! - PROBE and RESET are answered with the identity status without ever
//!   reaching the caller.
//! - READ and WRITE are captured whole and returned as an [`Operation`].
//!   The caller answers with [`Eeprom::send_data`], which will not start
//!   transmitting before the reply delay has elapsed.
//! - Anything else, a command byte that does not decode, or a READ/WRITE
//!   whose arguments do not fully arrive, is dropped: the engine waits for the stray bits to pass, resets the
//!   transceiver and goes back to listening.
//!
//! # Timing
//!
//! The reply window is a few microseconds wide. Waiting is a tight spin on
//! the monotonic clock, and nothing between receiving the host's last byte
//! and transmitting the reply allocates, logs or blocks on anything but the
//! transceiver.

use joybus_hal::{BusError, JoybusTransceiver, Monotonic};

use crate::command::Command;
use crate::operation::{Operation, PAGE_SIZE};
use crate::stats::{bump, BusStats};
use crate::status::{DeviceStatus, EepromType};
use crate::timing::BusTiming;

/// Why a frame was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Resync {
    /// The command byte is not one we implement
    UnknownCommand(u8),
    /// A READ/WRITE argument failed to arrive
    Truncated(Command, BusError),
    /// The command byte itself did not decode
    Malformed,
}

/// Emulated EEPROM on one Joybus line
pub struct Eeprom<P, C> {
    port: P,
    clock: C,
    kind: EepromType,
    status: DeviceStatus,
    timing: BusTiming,
    /// Earliest time a reply to the pending READ/WRITE may start
    reply_deadline: Option<u64>,
    stats: BusStats,
}

impl<P, C> Eeprom<P, C>
where
    P: JoybusTransceiver,
    C: Monotonic,
{
    /// Bind an EEPROM of type `kind` to an initialized transceiver
    ///
    /// Transceiver construction is where hardware binding can fail; it
    /// happens before this call so a half-built engine never exists.
    pub fn new(kind: EepromType, port: P, clock: C) -> Self {
        Self::with_timing(kind, port, clock, BusTiming::DEFAULT)
    }

    /// Like [`Eeprom::new`] with explicit bus timing
    pub fn with_timing(kind: EepromType, port: P, clock: C, timing: BusTiming) -> Self {
        Self {
            port,
            clock,
            kind,
            status: kind.status(),
            timing,
            reply_deadline: None,
            stats: BusStats::default(),
        }
    }

    /// EEPROM type being emulated
    pub fn kind(&self) -> EepromType {
        self.kind
    }

    /// Identity status sent on discovery
    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }

    /// Bus timing in use
    pub fn timing(&self) -> &BusTiming {
        &self.timing
    }

    /// Offset the transceiver program was installed at
    ///
    /// Other ports on the same PIO block can reuse it instead of loading
    /// the program again.
    pub fn offset(&self) -> u8 {
        self.port.offset()
    }

    /// Traffic counters
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }

    /// Clear the traffic counters
    pub fn reset_stats(&mut self) {
        self.stats = BusStats::default();
    }

    /// Reply deadline of the last READ/WRITE, if one was received
    pub fn reply_deadline(&self) -> Option<u64> {
        self.reply_deadline
    }

    /// Tear down the engine and hand the transceiver back
    ///
    /// Dropping the returned port releases the hardware.
    pub fn release(self) -> P {
        self.port
    }

    /// Block until the host sends a READ or WRITE
    ///
    /// Discovery commands and bad frames are handled on the way.
    pub fn wait_for_command(&mut self) -> Operation {
        loop {
            if let Some(op) = self.poll_command() {
                return op;
            }
        }
    }

    /// Run one pass of the command loop
    ///
    /// Returns `None` when the receive window passed without a command, or
    /// when the command was handled internally. Lets the caller do idle
    /// work between passes.
    #[inline(always)]
    pub fn poll_command(&mut self) -> Option<Operation> {
        let byte = match self.port.receive_byte(self.timing.receive_timeout_us) {
            Ok(byte) => byte,
            Err(BusError::Timeout) => {
                bump(&mut self.stats.idle_polls);
                return None;
            }
            Err(BusError::Framing) => {
                self.resync(Resync::Malformed);
                return None;
            }
        };

        let command = Command::from_byte(byte);
        let Some(arg_len) = command.argument_len() else {
            self.resync(Resync::UnknownCommand(byte));
            return None;
        };

        if command.is_discovery() {
            // Let the host's stop bit finish
            self.clock.busy_wait_us(self.timing.reply_delay_us);
            self.port.send(self.status.as_bytes());
            bump(&mut self.stats.probes);
            return None;
        }

        // Page byte, then the payload for writes
        let mut args = [0u8; 1 + PAGE_SIZE];
        if let Err(e) = self.receive_args(&mut args[..arg_len]) {
            self.resync(Resync::Truncated(command, e));
            return None;
        }
        self.arm_reply_deadline();

        let page = args[0];
        if command == Command::Write {
            let mut data = [0u8; PAGE_SIZE];
            data.copy_from_slice(&args[1..]);
            bump(&mut self.stats.writes);
            Some(Operation::write(page, data))
        } else {
            bump(&mut self.stats.reads);
            Some(Operation::read(page))
        }
    }

    /// Send a reply to the last READ/WRITE
    ///
    /// Spins until the reply deadline, then transmits `data` verbatim and
    /// returns once the transceiver has put it on the line. No extra delay
    /// is added once the deadline has passed. The caller picks the length
    /// the host expects.
    #[inline(always)]
    pub fn send_data(&mut self, data: &[u8]) {
        if let Some(deadline) = self.reply_deadline {
            self.clock.spin_until(deadline);
        }
        self.port.send(data);
    }

    /// Drop anything the transceiver buffered while nobody was listening
    ///
    /// Call after idle work that kept the engine off the bus for longer
    /// than a receive window. Bytes from transactions the host has already
    /// given up on are discarded instead of being answered late.
    pub fn discard_input(&mut self) {
        self.port.reset();

        #[cfg(feature = "defmt")]
        defmt::debug!("joybus input discarded");
    }

    #[inline(always)]
    fn arm_reply_deadline(&mut self) {
        self.reply_deadline = Some(self.clock.deadline_after(self.timing.reply_delay_us));
    }

    #[inline(always)]
    fn receive_args(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        match self.port.receive(buf, self.timing.receive_timeout_us)? {
            n if n == buf.len() => Ok(()),
            _ => Err(BusError::Timeout),
        }
    }

    fn resync(&mut self, cause: Resync) {
        match cause {
            Resync::UnknownCommand(_) => bump(&mut self.stats.unknown_commands),
            Resync::Truncated(..) => bump(&mut self.stats.truncated_frames),
            Resync::Malformed => bump(&mut self.stats.malformed_frames),
        }

        // Wait out whatever is left of the frame before listening again
        self.clock.busy_wait_us(self.timing.reset_wait_us);
        self.port.reset();

        #[cfg(feature = "defmt")]
        defmt::debug!("joybus resync: {}", cause);
    }
}
