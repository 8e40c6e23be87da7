//! Peripheral Drivers
//!
//! Register, strobe, FIFO and synthesizer helpers for the transceiver.
//! Each is a thin sequence of byte exchanges on a [`ByteTransport`].
//!
//! [`ByteTransport`]: crate::hal::spi::ByteTransport

pub mod fifo;
pub mod freq;
pub mod transceiver;

pub use freq::FrequencyBand;
pub use transceiver::Transceiver;
