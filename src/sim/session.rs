//! Simulated signal lines shared by master and peripheral
//!
//! Each of the four lines is guarded by its own mutex, held only for a
//! single read or write. The clock line is the exception: its lock also
//! owns the [`Peripheral`], so a rising edge (store the level, sample MOSI,
//! drive MISO, maybe run a protocol step) is atomic with respect to every
//! other clock writer. Lock order is always clock, then a data line.
//!
//! While the chip is selected and no byte is half shifted, MISO rests at
//! CHIP_RDYn, which is what the reset sequence polls.

use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::config::BusTiming;
use crate::hal::spi::{BitBangSpi, NoDelay};
use crate::sim::peripheral::{Peripheral, Phase};
use crate::types::{Level, StatusByte};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One logic line with a per-line lock
#[derive(Debug, Default)]
pub struct SignalLine {
    level: Mutex<Level>,
}

impl SignalLine {
    /// Create a line at `level`
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self {
            level: Mutex::new(level),
        }
    }

    /// Current level
    #[must_use]
    pub fn read(&self) -> Level {
        *lock(&self.level)
    }

    /// Drive the line
    pub fn write(&self, level: Level) {
        *lock(&self.level) = level;
    }
}

struct Clock {
    level: Level,
    peripheral: Peripheral,
}

/// Which of the four bus lines a [`SimPin`] is attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    /// Master out, slave in
    Mosi,
    /// Master in, slave out
    Miso,
    /// Serial clock
    Sclk,
    /// Chip select, active low
    Csn,
}

/// A simulated bus session: four lines plus the peripheral behind them
///
/// Created explicitly and shared by reference between the master and any
/// observer threads; dropping it tears the simulation down.
pub struct SimSession {
    mosi: SignalLine,
    miso: SignalLine,
    csn: SignalLine,
    sclk: Mutex<Clock>,
}

impl SimSession {
    /// New session: clock and data low, chip deselected, peripheral at power-on
    #[must_use]
    pub fn new() -> Self {
        Self::from_peripheral(Peripheral::new())
    }

    /// New session around a prepared peripheral
    #[must_use]
    pub fn from_peripheral(peripheral: Peripheral) -> Self {
        Self {
            mosi: SignalLine::new(Level::Low),
            miso: SignalLine::new(Level::Low),
            csn: SignalLine::new(Level::High),
            sclk: Mutex::new(Clock {
                level: Level::Low,
                peripheral,
            }),
        }
    }

    /// Master drives MOSI
    pub fn write_mosi(&self, level: Level) {
        self.mosi.write(level);
    }

    /// Master samples MISO
    #[must_use]
    pub fn read_miso(&self) -> Level {
        self.miso.read()
    }

    /// Master drives SCLK; a rising edge while selected clocks the peripheral
    pub fn write_sclk(&self, level: Level) {
        let mut clock = lock(&self.sclk);
        let rising = clock.level.is_low() && level.is_high();
        clock.level = level;

        if self.csn.read().is_high() {
            return;
        }
        if rising {
            let mosi = self.mosi.read();
            let miso = clock.peripheral.clock_edge(mosi);
            self.miso.write(miso);
        } else {
            self.rest_miso(&clock);
        }
    }

    /// Master drives CSn; releasing it resets the peripheral to READY
    pub fn write_csn(&self, level: Level) {
        self.csn.write(level);
        let mut clock = lock(&self.sclk);
        if level.is_high() {
            clock.peripheral.deselect();
        } else {
            self.rest_miso(&clock);
        }
    }

    // Only between bytes with the clock low, so a bit the master has yet
    // to sample is never overwritten.
    fn rest_miso(&self, clock: &Clock) {
        if clock.level.is_low() && clock.peripheral.current_bit() == 7 {
            self.miso.write(clock.peripheral.ready_level());
        }
    }

    /// Level of any line, as an observer sees it
    #[must_use]
    pub fn level(&self, line: Line) -> Level {
        match line {
            Line::Mosi => self.mosi.read(),
            Line::Miso => self.miso.read(),
            Line::Sclk => lock(&self.sclk).level,
            Line::Csn => self.csn.read(),
        }
    }

    /// Master-side pin handle for one line
    #[must_use]
    pub const fn pin(&self, line: Line) -> SimPin<'_> {
        SimPin {
            session: self,
            line,
        }
    }

    /// Bit-banged master wired to this session, with no delays
    #[must_use]
    pub fn transport(&self) -> SimSpi<'_> {
        BitBangSpi::new(
            self.pin(Line::Mosi),
            self.pin(Line::Miso),
            self.pin(Line::Sclk),
            self.pin(Line::Csn),
            NoDelay,
        )
        .with_timing(BusTiming::INSTANT)
    }

    /// Inspect the peripheral under the clock lock
    pub fn with_peripheral<R>(&self, f: impl FnOnce(&Peripheral) -> R) -> R {
        f(&lock(&self.sclk).peripheral)
    }

    /// Mutate the peripheral under the clock lock
    pub fn with_peripheral_mut<R>(&self, f: impl FnOnce(&mut Peripheral) -> R) -> R {
        f(&mut lock(&self.sclk).peripheral)
    }

    /// Standard register value
    #[must_use]
    pub fn standard_register(&self, index: u8) -> Option<u8> {
        self.with_peripheral(|p| p.standard_register(index))
    }

    /// Extended register value
    #[must_use]
    pub fn extended_register(&self, index: u8) -> Option<u8> {
        self.with_peripheral(|p| p.extended_register(index))
    }

    /// Peripheral status byte
    #[must_use]
    pub fn status(&self) -> StatusByte {
        self.with_peripheral(Peripheral::status)
    }

    /// Peripheral protocol phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.with_peripheral(Peripheral::phase)
    }

    /// Queue bytes into the RX FIFO; returns how many fit
    pub fn inject_rx(&self, bytes: &[u8]) -> usize {
        self.with_peripheral_mut(|p| p.inject_rx(bytes))
    }

    /// Take everything the master has queued for transmission
    #[must_use]
    pub fn drain_tx(&self) -> Vec<u8> {
        self.with_peripheral_mut(|p| core::iter::from_fn(|| p.pop_tx()).collect())
    }

    /// Model a crystal that does or does not settle after reset
    ///
    /// A crystal settling while the chip is selected shows up on MISO at once.
    pub fn set_crystal_stable(&self, stable: bool) {
        let mut clock = lock(&self.sclk);
        clock.peripheral.set_crystal_stable(stable);
        if self.csn.read().is_low() {
            self.rest_miso(&clock);
        }
    }
}

impl Default for SimSession {
    fn default() -> Self {
        Self::new()
    }
}

/// `embedded-hal` pin backed by one line of a [`SimSession`]
#[derive(Clone, Copy)]
pub struct SimPin<'a> {
    session: &'a SimSession,
    line: Line,
}

impl SimPin<'_> {
    /// Line this pin is attached to
    #[must_use]
    pub const fn line(&self) -> Line {
        self.line
    }

    fn drive(&self, level: Level) {
        match self.line {
            Line::Mosi => self.session.write_mosi(level),
            Line::Miso => self.session.miso.write(level),
            Line::Sclk => self.session.write_sclk(level),
            Line::Csn => self.session.write_csn(level),
        }
    }
}

impl ErrorType for SimPin<'_> {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(Level::High);
        Ok(())
    }
}

impl InputPin for SimPin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.session.level(self.line).is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.session.level(self.line).is_low())
    }
}

/// Bit-banged master over simulated lines
pub type SimSpi<'a> = BitBangSpi<SimPin<'a>, SimPin<'a>, SimPin<'a>, SimPin<'a>, NoDelay>;
