//! Transceiver Bit-Bang Firmware Library
//!
//! Talks to a CC1200-class sub-GHz transceiver over a software (bit-banged)
//! SPI bus on an STM32G474, and ships a software model of the chip's SPI
//! slave so the whole stack can be exercised on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DRIVER LAYER                            │
//! │  Registers  │  Bitfields  │  Strobes  │  FIFOs  │  Band      │
//! │                 Doppler correction (orbital)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     PROTOCOL LAYER                           │
//! │        Command byte / extended address encoding              │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / TRANSPORT LAYER                      │
//! │  ByteTransport  │  BitBangSpi<embedded-hal pins>             │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  STM32 GPIO (embassy-stm32)  │  Simulated lines + peripheral │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - `std` (default): host build with `log` output and the threaded
//!   simulator session.
//! - `embedded`: `no_std` target build with embassy and `defmt`; build it
//!   with `--no-default-features --features embedded`.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

mod fmt;

/// System configuration and constants
pub mod config;

/// Error taxonomy
pub mod error;

/// Shared types used across modules
pub mod types;

/// Command byte and register address encoding
pub mod protocol;

/// Hardware Abstraction Layer
///
/// Bit-banged SPI over `embedded-hal` pins, plus board wiring.
pub mod hal;

/// Peripheral Drivers
///
/// Register-level driver for the transceiver.
pub mod drivers;

/// Transceiver simulator
pub mod sim;

/// Satellite pass geometry and Doppler correction
pub mod orbital;

pub use error::{TcvrError, TcvrResult};

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::drivers::{FrequencyBand, Transceiver};
    pub use crate::error::{TcvrError, TcvrResult};
    pub use crate::hal::spi::{BitBangSpi, ByteTransport};
    pub use crate::orbital::{GeoPoint, Heading, PolarOrbit};
    pub use crate::protocol::{Access, Granularity, RegisterAddress, Strobe};
    pub use crate::types::*;

    // Embassy
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Duration, Instant, Timer};
}
