//! Test doubles for the transceiver and the clock

use core::cell::Cell;

use heapless::{Deque, Vec};
use joybus_hal::{BusError, JoybusTransceiver, Monotonic};

/// Time one byte takes on the wire (8 bits of 4 µs)
pub const BYTE_TIME_US: u64 = 32;

/// Clock that advances one microsecond every time it is read
///
/// Spinning on it therefore always terminates.
pub struct FakeClock {
    now: Cell<u64>,
}

impl FakeClock {
    pub fn new(start_us: u64) -> Self {
        Self {
            now: Cell::new(start_us),
        }
    }

    /// Current time without ticking
    pub fn peek(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }
}

impl Monotonic for FakeClock {
    fn now_us(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + 1);
        now
    }
}

/// What the host puts on the line next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Byte(u8),
    Silence,
    Garbage,
}

/// Observable transceiver activity, with the time it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    Received(u8, u64),
    Sent(Vec<u8, 16>, u64),
    Reset(u64),
}

/// Transceiver fed from a script of host bytes
///
/// Bytes handed to [`ScriptedPort::buffer_bytes`] stand for bytes that
/// already arrived while nobody was receiving. They are delivered before
/// the script and dropped by `reset`, like a hardware receive FIFO.
pub struct ScriptedPort<'a> {
    clock: &'a FakeClock,
    script: Deque<Line, 64>,
    fifo: Deque<u8, 16>,
    trace: Vec<Trace, 64>,
    offset: u8,
}

impl<'a> ScriptedPort<'a> {
    pub fn new(clock: &'a FakeClock, lines: &[Line]) -> Self {
        let mut script = Deque::new();
        for &line in lines {
            script.push_back(line).unwrap();
        }
        Self {
            clock,
            script,
            fifo: Deque::new(),
            trace: Vec::new(),
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u8) -> Self {
        self.offset = offset;
        self
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.script.push_back(Line::Byte(byte)).unwrap();
        }
    }

    pub fn buffer_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.fifo.push_back(byte).unwrap();
        }
    }

    pub fn trace(&self) -> &[Trace] {
        &self.trace
    }

    /// Every payload sent, in order
    pub fn sent(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.trace.iter().filter_map(|t| match t {
            Trace::Sent(bytes, at) => Some((bytes.as_slice(), *at)),
            _ => None,
        })
    }

    pub fn resets(&self) -> usize {
        self.trace
            .iter()
            .filter(|t| matches!(t, Trace::Reset(_)))
            .count()
    }

    /// Time the most recent host byte finished arriving
    pub fn last_received_at(&self) -> Option<u64> {
        self.trace.iter().rev().find_map(|t| match t {
            Trace::Received(_, at) => Some(*at),
            _ => None,
        })
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl JoybusTransceiver for ScriptedPort<'_> {
    fn receive(&mut self, buf: &mut [u8], timeout_us: u32) -> Result<usize, BusError> {
        for slot in buf.iter_mut() {
            if let Some(byte) = self.fifo.pop_front() {
                *slot = byte;
                self.trace
                    .push(Trace::Received(byte, self.clock.peek()))
                    .unwrap();
                continue;
            }
            match self.script.pop_front() {
                Some(Line::Byte(byte)) => {
                    self.clock.advance(BYTE_TIME_US);
                    *slot = byte;
                    self.trace
                        .push(Trace::Received(byte, self.clock.peek()))
                        .unwrap();
                }
                Some(Line::Garbage) => return Err(BusError::Framing),
                Some(Line::Silence) | None => {
                    self.clock.advance(timeout_us as u64);
                    return Err(BusError::Timeout);
                }
            }
        }
        Ok(buf.len())
    }

    fn send(&mut self, data: &[u8]) {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(data).unwrap();
        self.trace.push(Trace::Sent(bytes, self.clock.peek())).unwrap();
        self.clock.advance(data.len() as u64 * BYTE_TIME_US);
    }

    fn reset(&mut self) {
        self.fifo.clear();
        self.trace.push(Trace::Reset(self.clock.peek())).unwrap();
    }

    fn offset(&self) -> u8 {
        self.offset
    }
}
