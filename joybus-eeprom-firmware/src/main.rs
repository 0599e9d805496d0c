//! Joybus EEPROM - save device firmware
//!
//! Emulates a cartridge save EEPROM on the console's controller bus.
//! The whole chip lives in RAM; changed banks are written to flash once the
//! bus has been quiet for a while.
//!
//! The data line of the controller port connects to GPIO 2.
//!
//! Flash writes invalidate the XIP cache, so the code between receiving a
//! command and replying to it is kept in RAM. See [`serve_once`].

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_time::{Duration, Instant};
use {defmt_rtt as _, panic_probe as _};

use joybus_eeprom::{Eeprom, EepromImage, Operation};
use joybus_hal_rp2040::{JoybusProgram, PioJoybusPort, ProgramSlot, Rp2040PageStorage, TimerClock};

mod config;
mod persistence;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

type JoybusEeprom<'d, 'p> = Eeprom<PioJoybusPort<'d, 'p, PIO0, 0>, TimerClock>;

/// One receive window: answer whatever the host sends
///
/// Lives in RAM together with everything inlined into it, so a reply never
/// waits on a flash fetch. Returns the READ/WRITE that was served.
#[inline(never)]
#[link_section = ".data.ram_func"]
fn serve_once(eeprom: &mut JoybusEeprom<'_, '_>, image: &mut EepromImage) -> Option<Operation> {
    let op = eeprom.poll_command()?;
    let reply = image.serve(&op);
    eeprom.send_data(&reply);
    Some(op)
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Joybus EEPROM firmware starting...");

    let p = embassy_rp::init(Default::default());
    let kind = config::EEPROM_TYPE;
    info!(
        "Emulating {:?}: {} pages, persistence {}",
        kind,
        kind.page_count(),
        config::PERSIST
    );

    let mut image = EepromImage::new(kind);
    let mut storage = Rp2040PageStorage::new(p.FLASH, p.DMA_CH0);
    if config::PERSIST {
        persistence::load(&mut storage, &mut image).await;
    }

    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);

    let program = match JoybusProgram::load(&mut common, ProgramSlot::Auto) {
        Ok(program) => program,
        Err(e) => defmt::panic!("Failed to load Joybus program: {:?}", e),
    };
    let port = PioJoybusPort::new(&mut common, &program, sm0, p.PIN_2);
    let mut eeprom = Eeprom::new(kind, port, TimerClock);

    info!("Joybus program installed at offset {}", eeprom.offset());

    let flush_after = Duration::from_millis(config::FLUSH_IDLE_MS);
    let mut last_write = Instant::now();

    loop {
        match serve_once(&mut eeprom, &mut image) {
            Some(op) => {
                if op.is_write() {
                    last_write = Instant::now();
                }
            }
            None => {
                // A flush blocks the bus for a few milliseconds; the console
                // retries anything it sends meanwhile
                if config::PERSIST && image.is_dirty() && last_write.elapsed() >= flush_after {
                    persistence::flush(&mut storage, &mut image).await;
                    eeprom.discard_input();
                    debug!("Bus stats: {:?}", eeprom.stats());
                }
            }
        }
    }
}
