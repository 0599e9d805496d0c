//! PIO-based Joybus transceiver
//!
//! One [`JoybusProgram`] is loaded per PIO block and shared by every port
//! on that block. Each [`PioJoybusPort`] owns one state machine and one
//! pin for as long as it lives.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Level, Pull};
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, Instance, LoadedProgram, Pin, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use joybus_hal::{BusError, JoybusTransceiver, Monotonic, ProgramSlot};

use crate::clock::TimerClock;
use crate::pio::{
    calc_clock_divider, decode_rx_word, encode_tx_word, BYTE_TIME_US, JOYBUS_PIO_FREQ_HZ,
    STOP_BIT_US,
};

/// Errors binding a transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError {
    /// Not enough free instruction memory, or the requested offset is taken
    ProgramSpace,
}

/// Joybus program installed in a PIO block
pub struct JoybusProgram<'d, PIO: Instance> {
    loaded: LoadedProgram<'d, PIO>,
    read_addr: u8,
    write_addr: u8,
}

impl<'d, PIO: Instance> JoybusProgram<'d, PIO> {
    /// Load the Joybus program into `common`
    ///
    /// `ProgramSlot::At` pins the program to an offset, otherwise any free
    /// region is used.
    pub fn load(common: &mut Common<'d, PIO>, slot: ProgramSlot) -> Result<Self, PortError> {
        let prg = pio_proc::pio_asm!(
            "public read:",
            "    set pindirs, 0",      // Release the line
            "    mov isr, null",       // Drop leftover stop bits
            "read_bit:",
            "    wait 0 pin 0 [7]",    // Falling edge, then 2 µs
            "    in pins, 1",          // Sample
            "    wait 1 pin 0",
            "    jmp read_bit",
            "public write:",
            "    pull block",
            "    set x, 7",
            "write_bit:",
            "    set pindirs, 1 [3]",  // 1 µs low
            "    out pindirs, 1 [7]",  // 2 µs data (inverted)
            "    set pindirs, 0 [2]",  // 1 µs high, including the jmp
            "    jmp x-- write_bit",
            "    out y, 1",            // Last byte flag
            "    jmp !y write",
            "    set pindirs, 1 [7]",  // 2 µs stop bit
            "    set pindirs, 0",
            "    jmp read",
        );

        let mut program = prg.program;
        program.origin = slot.offset();

        let loaded = common
            .try_load_program(&program)
            .map_err(|_| PortError::ProgramSpace)?;

        let read_addr = loaded.origin + prg.public_defines.read as u8;
        let write_addr = loaded.origin + prg.public_defines.write as u8;

        Ok(Self {
            loaded,
            read_addr,
            write_addr,
        })
    }

    /// Instruction offset the program was installed at
    pub fn offset(&self) -> u8 {
        self.loaded.origin
    }

    /// Free the program's instruction memory
    ///
    /// Every port created from this program must have been dropped first.
    pub fn unload(self, common: &mut Common<'d, PIO>) {
        // SAFETY: ports borrow the program while alive, so taking it by
        // value means no state machine is still executing it
        unsafe { common.free_instr(self.loaded.used_memory) };
    }
}

/// Joybus transceiver on one PIO state machine
///
/// Dropping the port stops the state machine and releases the line, so
/// the state machine can be reused.
pub struct PioJoybusPort<'d, 'p, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    pin: Pin<'d, PIO>,
    program: &'p JoybusProgram<'d, PIO>,
}

impl<'d, 'p, PIO: Instance, const SM: usize> PioJoybusPort<'d, 'p, PIO, SM> {
    /// Bind a state machine and a pin to the Joybus program
    ///
    /// # Arguments
    /// * `common` - PIO common resources of the block `program` lives in
    /// * `program` - Loaded Joybus program
    /// * `sm` - State machine to run the transceiver on
    /// * `data_pin` - GPIO connected to the console's data line
    pub fn new<DATA: PioPin>(
        common: &mut Common<'d, PIO>,
        program: &'p JoybusProgram<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        data_pin: Peri<'d, DATA>,
    ) -> Self {
        let mut pin = common.make_pio_pin(data_pin);
        pin.set_pull(Pull::Up);

        let mut cfg = Config::default();
        cfg.use_program(&program.loaded, &[]);
        cfg.set_in_pins(&[&pin]);
        cfg.set_out_pins(&[&pin]);
        cfg.set_set_pins(&[&pin]);
        cfg.shift_in = ShiftConfig {
            threshold: 8,
            direction: ShiftDirection::Left,
            auto_fill: true,
        };
        cfg.shift_out = ShiftConfig {
            threshold: 32,
            direction: ShiftDirection::Left,
            auto_fill: false,
        };
        cfg.clock_divider =
            U24F8::from_bits(calc_clock_divider(clk_sys_freq(), JOYBUS_PIO_FREQ_HZ));

        sm.set_config(&cfg);
        // Open drain: latch low, drive by direction only
        sm.set_pins(Level::Low, &[&pin]);
        sm.set_pin_dirs(PioDirection::In, &[&pin]);
        sm.exec_jmp(program.read_addr);
        sm.set_enable(true);

        Self { sm, pin, program }
    }

    /// Pull one byte from the RX FIFO, giving up at `deadline_us`
    #[inline(always)]
    fn pull_byte(&mut self, deadline_us: u64) -> Result<u8, BusError> {
        loop {
            if let Some(word) = self.sm.rx().try_pull() {
                return Ok(decode_rx_word(word));
            }
            if TimerClock.now_us() >= deadline_us {
                return Err(BusError::Timeout);
            }
        }
    }
}

impl<PIO: Instance, const SM: usize> JoybusTransceiver for PioJoybusPort<'_, '_, PIO, SM> {
    #[inline(always)]
    fn receive(&mut self, buf: &mut [u8], timeout_us: u32) -> Result<usize, BusError> {
        for slot in buf.iter_mut() {
            *slot = self.pull_byte(TimerClock.deadline_after(timeout_us))?;
        }
        Ok(buf.len())
    }

    #[inline(always)]
    fn send(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        // Switch to the transmit entry point; the program returns to
        // receiving after the stop bit
        self.sm.set_enable(false);
        self.sm.clear_fifos();
        self.sm.exec_jmp(self.program.write_addr);
        self.sm.set_enable(true);

        let last = data.len() - 1;
        for (i, &byte) in data.iter().enumerate() {
            let word = encode_tx_word(byte, i == last);
            while !self.sm.tx().try_push(word) {
                core::hint::spin_loop();
            }
        }

        // The last word leaves the FIFO when its first bit starts
        while !self.sm.tx().empty() {
            core::hint::spin_loop();
        }
        TimerClock.busy_wait_us(BYTE_TIME_US + STOP_BIT_US);
    }

    #[inline(always)]
    fn reset(&mut self) {
        self.sm.set_enable(false);
        self.sm.clear_fifos();
        self.sm.restart();
        self.sm.exec_jmp(self.program.read_addr);
        self.sm.set_enable(true);
    }

    fn offset(&self) -> u8 {
        self.program.offset()
    }
}

impl<PIO: Instance, const SM: usize> Drop for PioJoybusPort<'_, '_, PIO, SM> {
    fn drop(&mut self) {
        self.sm.set_enable(false);
        self.sm.set_pin_dirs(PioDirection::In, &[&self.pin]);
    }
}
