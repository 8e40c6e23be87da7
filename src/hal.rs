//! Hardware Abstraction Layer
//!
//! The bit-banged SPI transport, generic over `embedded-hal` pins so the
//! same code drives real GPIOs or simulated lines. Board-specific pin
//! wiring lives in [`gpio`] and is only built for the embedded target.

pub mod spi;

#[cfg(feature = "embedded")]
pub mod gpio;
