//! Error types for the register layer
//!
//! The byte transport and the simulator never fail; a malformed command is
//! absorbed on the wire. Only the logical operations built on top of the
//! transport reject requests, and they do it with these errors.

use thiserror::Error;

/// Transceiver operation error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TcvrError {
    /// Address is neither a standard nor an extended register
    #[error("invalid register address {0:#06x}")]
    InvalidRegister(u16),
    /// Byte is not a command strobe address
    #[error("invalid strobe {0:#04x}")]
    InvalidStrobe(u8),
    /// Argument outside its permitted range (e.g. burst length <= 1)
    #[error("parameter out of range")]
    ParameterOutOfRange,
    /// Dequeue attempted on an empty RX FIFO
    #[error("dequeuing from empty RX FIFO")]
    RxFifoEmpty,
    /// Enqueue would overflow the TX FIFO
    #[error("enqueuing to full TX FIFO")]
    TxFifoFull,
    /// Chip did not release SO after a reset within the poll budget
    #[error("peripheral unresponsive")]
    PeripheralUnresponsive,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TcvrError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidRegister(addr) => defmt::write!(f, "InvalidRegister({=u16:#x})", addr),
            Self::InvalidStrobe(addr) => defmt::write!(f, "InvalidStrobe({=u8:#x})", addr),
            Self::ParameterOutOfRange => defmt::write!(f, "ParameterOutOfRange"),
            Self::RxFifoEmpty => defmt::write!(f, "RxFifoEmpty"),
            Self::TxFifoFull => defmt::write!(f, "TxFifoFull"),
            Self::PeripheralUnresponsive => defmt::write!(f, "PeripheralUnresponsive"),
        }
    }
}

/// Result alias for transceiver operations
pub type TcvrResult<T> = Result<T, TcvrError>;
