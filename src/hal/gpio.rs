//! GPIO Abstractions
//!
//! Board wiring of the bit-banged bus onto STM32 GPIOs, plus the status LED.

use embassy_stm32::gpio::{Input, Output};
use embassy_time::Delay;

use crate::hal::spi::BitBangSpi;

/// Bit-banged bus on four STM32 GPIOs
pub type BoardSpi<'d> = BitBangSpi<Output<'d>, Input<'d>, Output<'d>, Output<'d>, Delay>;

/// Wire configured GPIOs into a bus timed by the embassy delay
///
/// `new` puts SCLK low and CSn high whatever level the pins were built with.
#[must_use]
pub fn board_spi<'d>(
    mosi: Output<'d>,
    miso: Input<'d>,
    sclk: Output<'d>,
    csn: Output<'d>,
) -> BoardSpi<'d> {
    BitBangSpi::new(mosi, miso, sclk, csn, Delay)
}

/// Status LED driver
pub struct StatusLed<'d> {
    pin: Output<'d>,
}

impl<'d> StatusLed<'d> {
    /// Create a new status LED (initially off)
    #[must_use]
    pub fn new(pin: Output<'d>) -> Self {
        let mut led = Self { pin };
        led.off();
        led
    }

    /// Turn LED on
    pub fn on(&mut self) {
        self.pin.set_high();
    }

    /// Turn LED off
    pub fn off(&mut self) {
        self.pin.set_low();
    }

    /// Show a self-test result: steady on for pass, off for fail
    pub fn show(&mut self, passed: bool) {
        if passed {
            self.on();
        } else {
            self.off();
        }
    }
}
