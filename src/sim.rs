//! Transceiver Simulator
//!
//! A software model of the chip's SPI slave, for exercising the transport
//! and the register driver without hardware. [`peripheral`] is the pure
//! state machine; [`session`] puts it behind four lockable signal lines
//! that the master and any observers share across threads.

pub mod peripheral;

#[cfg(feature = "std")]
pub mod session;

pub use peripheral::{Cursor, Peripheral, Phase, Space};

#[cfg(feature = "std")]
pub use session::{Line, SignalLine, SimPin, SimSession, SimSpi};
