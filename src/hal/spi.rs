//! Bit-banged SPI master
//!
//! Exchanges one byte in each direction per [`ByteTransport::transfer`],
//! most significant bit first, SPI mode 0: data-out is set up while the
//! clock is low and data-in is sampled right after the rising edge.
//!
//! Pin errors are swallowed at this layer. A line that cannot be driven is
//! left as is and a line that cannot be read counts as LOW; the register
//! layer above is the only place failures are reported.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::BusTiming;
use crate::types::Level;

/// Byte-level access to the transceiver bus
///
/// A transaction is bracketed by [`open_transaction`](Self::open_transaction)
/// and [`close_transaction`](Self::close_transaction); bytes inside it are
/// exchanged strictly in call order.
pub trait ByteTransport {
    /// Assert chip select (drive it LOW)
    fn open_transaction(&mut self);

    /// Release chip select (drive it HIGH); aborts any partial operation
    fn close_transaction(&mut self);

    /// Shift `byte_out` out and return the byte shifted in
    fn transfer(&mut self, byte_out: u8) -> u8;

    /// Current level of the data-in line
    fn data_in_is_high(&mut self) -> bool;

    /// Busy-wait for roughly `ns` nanoseconds
    fn pause_ns(&mut self, ns: u32);

    /// Run `f` inside a transaction, closing it afterwards
    fn transaction<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.open_transaction();
        let result = f(self);
        self.close_transaction();
        result
    }
}

/// Delay provider that returns immediately
///
/// Simulated lines have no electrical timing to respect.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Software SPI master on four GPIO lines
pub struct BitBangSpi<MOSI, MISO, SCLK, CS, D> {
    mosi: MOSI,
    miso: MISO,
    sclk: SCLK,
    cs: CS,
    delay: D,
    timing: BusTiming,
    selected: bool,
}

impl<MOSI, MISO, SCLK, CS, D> BitBangSpi<MOSI, MISO, SCLK, CS, D>
where
    MOSI: OutputPin,
    MISO: InputPin,
    SCLK: OutputPin,
    CS: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the lines and park the bus idle
    /// (clock LOW, chip select HIGH)
    pub fn new(mosi: MOSI, miso: MISO, sclk: SCLK, cs: CS, delay: D) -> Self {
        let mut spi = Self {
            mosi,
            miso,
            sclk,
            cs,
            delay,
            timing: BusTiming::default(),
            selected: false,
        };
        drive(&mut spi.sclk, Level::Low);
        drive(&mut spi.cs, Level::High);
        spi
    }

    /// Replace the bus timing
    #[must_use]
    pub fn with_timing(mut self, timing: BusTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Current bus timing
    #[must_use]
    pub const fn timing(&self) -> BusTiming {
        self.timing
    }

    /// True while a transaction is open
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Give the lines back
    pub fn release(self) -> (MOSI, MISO, SCLK, CS, D) {
        (self.mosi, self.miso, self.sclk, self.cs, self.delay)
    }

    fn wait(&mut self, ns: u32) {
        if ns > 0 {
            self.delay.delay_ns(ns);
        }
    }
}

impl<MOSI, MISO, SCLK, CS, D> ByteTransport for BitBangSpi<MOSI, MISO, SCLK, CS, D>
where
    MOSI: OutputPin,
    MISO: InputPin,
    SCLK: OutputPin,
    CS: OutputPin,
    D: DelayNs,
{
    fn open_transaction(&mut self) {
        drive(&mut self.cs, Level::Low);
        self.selected = true;
        self.wait(self.timing.select_ns);
    }

    fn close_transaction(&mut self) {
        drive(&mut self.cs, Level::High);
        self.selected = false;
        self.wait(self.timing.select_ns);
    }

    fn transfer(&mut self, byte_out: u8) -> u8 {
        debug_assert!(self.selected, "transfer outside a transaction");
        let mut byte_in = 0u8;

        for bit in (0..8).rev() {
            drive(&mut self.mosi, Level::of_bit(byte_out, bit));
            self.wait(self.timing.settle_ns);

            drive(&mut self.sclk, Level::High);
            byte_in = (byte_in << 1) | u8::from(self.data_in_is_high());
            self.wait(self.timing.hold_ns);

            drive(&mut self.sclk, Level::Low);
        }

        self.wait(self.timing.settle_ns);
        byte_in
    }

    fn data_in_is_high(&mut self) -> bool {
        self.miso.is_high().unwrap_or(false)
    }

    fn pause_ns(&mut self, ns: u32) {
        self.wait(ns);
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: Level) {
    let _ = match level {
        Level::Low => pin.set_low(),
        Level::High => pin.set_high(),
    };
}
