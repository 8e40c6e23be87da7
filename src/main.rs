//! Transceiver Bit-Bang Self-Test
//!
//! Entry point for the STM32G474 board. Wires the bit-banged bus onto
//! PB12-PB15, resets the transceiver, round-trips a band select through
//! FS_CFG and reports the result on the status LED.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use tcvr_firmware::hal::gpio::{board_spi, BoardSpi, StatusLed};
use tcvr_firmware::prelude::*;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Transceiver bit-bang firmware v{}", env!("CARGO_PKG_VERSION"));

    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // Status LED (PA5 on Nucleo boards)
    let led = StatusLed::new(Output::new(p.PA5, Level::Low, Speed::Low));

    // PB15 = MOSI, PB14 = MISO, PB13 = SCLK, PB12 = CSn
    let bus = board_spi(
        Output::new(p.PB15, Level::Low, Speed::VeryHigh),
        Input::new(p.PB14, Pull::None),
        Output::new(p.PB13, Level::Low, Speed::VeryHigh),
        Output::new(p.PB12, Level::High, Speed::VeryHigh),
    );

    info!(
        "Bit-banged SPI on {=str} {=str} {=str} {=str}",
        pins::SPI_MOSI,
        pins::SPI_MISO,
        pins::SPI_SCLK,
        pins::SPI_CSN
    );

    let mut radio = Transceiver::new(bus);
    let passed = match self_test(&mut radio) {
        Ok(status) => {
            info!("Self-test passed, status {}", status);
            true
        }
        Err(e) => {
            error!("Self-test failed: {}", e);
            false
        }
    };

    spawner.must_spawn(status_task(led, passed));

    loop {
        Timer::after(Duration::from_secs(10)).await;
        match radio.status() {
            Ok(status) => info!("Status {}", status),
            Err(e) => warn!("Status read failed: {}", e),
        }
    }
}

/// Reset the chip and round-trip a band select through FS_CFG
fn self_test(radio: &mut Transceiver<BoardSpi<'static>>) -> TcvrResult<StatusByte> {
    radio.reset()?;

    let band = FrequencyBand::Band410To480;
    radio.set_band(band)?;
    radio.set_out_of_lock_detector(true)?;

    let (read_back, status) = radio.read_band()?;
    let (detector, _) = radio.out_of_lock_detector_enabled()?;
    if read_back != Some(band) || !detector {
        return Err(TcvrError::PeripheralUnresponsive);
    }

    let (fs_cfg, _) = radio.read_register(FS_CFG)?;
    info!("FS_CFG = {=u8:#x}", fs_cfg);
    Ok(status)
}

/// Status task - steady LED on pass, slow blink on failure
#[embassy_executor::task]
async fn status_task(mut led: StatusLed<'static>, passed: bool) {
    led.show(passed);
    if passed {
        return;
    }
    loop {
        led.on();
        Timer::after(Duration::from_millis(100)).await;
        led.off();
        Timer::after(Duration::from_millis(900)).await;
    }
}
