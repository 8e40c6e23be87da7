//! Shared types used across the transceiver firmware
//!
//! Logic levels, the chip status byte and bit/bitfield helpers.

use core::fmt;

/// Logic level of a single signal line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Level {
    /// Logic low (0)
    #[default]
    Low,
    /// Logic high (1)
    High,
}

impl Level {
    /// Level carried by `bit` of `byte` (0 = LSB)
    #[must_use]
    pub const fn of_bit(byte: u8, bit: u8) -> Self {
        if byte & (1 << (bit & 0x07)) != 0 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Check for logic high
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// Check for logic low
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }

    /// Value as a single bit
    #[must_use]
    pub const fn as_bit(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("LOW"),
            Self::High => f.write_str("HIGH"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Level {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Low => defmt::write!(f, "LOW"),
            Self::High => defmt::write!(f, "HIGH"),
        }
    }
}

/// Main radio control state reported in the status byte (bits 6:4)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChipState {
    /// Idle
    #[default]
    Idle,
    /// Receive mode
    Rx,
    /// Transmit mode
    Tx,
    /// Fast TX ready
    FastTxReady,
    /// Frequency synthesizer calibration is running
    Calibrate,
    /// PLL is settling
    Settling,
    /// RX FIFO has over/underflowed, flush with SFRX
    RxFifoError,
    /// TX FIFO has over/underflowed, flush with SFTX
    TxFifoError,
}

impl ChipState {
    /// Decode from the 3-bit state field
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Idle,
            1 => Self::Rx,
            2 => Self::Tx,
            3 => Self::FastTxReady,
            4 => Self::Calibrate,
            5 => Self::Settling,
            6 => Self::RxFifoError,
            _ => Self::TxFifoError,
        }
    }

    /// Encode to the 3-bit state field
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Rx => 1,
            Self::Tx => 2,
            Self::FastTxReady => 3,
            Self::Calibrate => 4,
            Self::Settling => 5,
            Self::RxFifoError => 6,
            Self::TxFifoError => 7,
        }
    }

    /// Human readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Idle => "IDLE state",
            Self::Rx => "Receive mode",
            Self::Tx => "Transmit mode",
            Self::FastTxReady => "Fast TX ready",
            Self::Calibrate => "Frequency synthesizer calibration is running",
            Self::Settling => "PLL is settling",
            Self::RxFifoError => "RX FIFO has over/underflowed",
            Self::TxFifoError => "TX FIFO has over/underflowed",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChipState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.description());
    }
}

/// Chip status byte, clocked out on every command byte
///
/// Bit 7 is CHIP_RDYn (active low), bits 6:4 hold the [`ChipState`],
/// bits 3:0 are reserved.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusByte(u8);

impl StatusByte {
    const CHIP_RDY_N: u8 = 0x80;
    const STATE_SHIFT: u8 = 4;

    /// Wrap a raw status byte
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Build a status byte from its fields
    #[must_use]
    pub const fn new(ready: bool, state: ChipState) -> Self {
        let rdy_n = if ready { 0 } else { Self::CHIP_RDY_N };
        Self(rdy_n | (state.bits() << Self::STATE_SHIFT))
    }

    /// Raw byte
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// True once the crystal has settled (CHIP_RDYn low)
    #[must_use]
    pub const fn chip_ready(self) -> bool {
        self.0 & Self::CHIP_RDY_N == 0
    }

    /// Decoded radio state
    #[must_use]
    pub const fn state(self) -> ChipState {
        ChipState::from_bits(self.0 >> Self::STATE_SHIFT)
    }
}

impl fmt::Debug for StatusByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusByte")
            .field("ready", &self.chip_ready())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for StatusByte {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "status({=u8:#x}, ready={=bool})", self.0, self.chip_ready());
    }
}

/// Contiguous bitfield within a register, bit positions 0-7
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitfield {
    msb: u8,
    lsb: u8,
}

impl Bitfield {
    /// Create a bitfield spanning `a..=b` (either order); `None` if a position exceeds 7
    #[must_use]
    pub const fn new(a: u8, b: u8) -> Option<Self> {
        if a > 7 || b > 7 {
            return None;
        }
        let (msb, lsb) = if a >= b { (a, b) } else { (b, a) };
        Some(Self { msb, lsb })
    }

    /// Mask with ones between msb and lsb inclusive
    #[must_use]
    pub const fn mask(self) -> u8 {
        let width = self.msb - self.lsb + 1;
        let ones = ((1u16 << width) - 1) as u8;
        ones << self.lsb
    }

    /// Extract the field value from a register byte
    #[must_use]
    pub const fn extract(self, register: u8) -> u8 {
        (register & self.mask()) >> self.lsb
    }

    /// Replace the field within `register` by `value` (excess bits dropped)
    #[must_use]
    pub const fn insert(self, register: u8, value: u8) -> u8 {
        let mask = self.mask();
        (register & !mask) | ((value << self.lsb) & mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_of_bit() {
        assert_eq!(Level::of_bit(0x80, 7), Level::High);
        assert_eq!(Level::of_bit(0x80, 6), Level::Low);
        assert_eq!(Level::of_bit(0x01, 0), Level::High);
    }

    #[test]
    fn status_ready_is_active_low() {
        assert!(StatusByte::from_raw(0x00).chip_ready());
        assert!(!StatusByte::from_raw(0x80).chip_ready());
        assert_eq!(StatusByte::from_raw(0x20).state(), ChipState::Tx);
        assert_eq!(StatusByte::new(false, ChipState::Rx).raw(), 0x90);
    }

    #[test]
    fn bitfield_masks() {
        assert_eq!(Bitfield::new(7, 0).unwrap().mask(), 0xFF);
        assert_eq!(Bitfield::new(3, 0).unwrap().mask(), 0x0F);
        assert_eq!(Bitfield::new(0, 3).unwrap().mask(), 0x0F);
        assert_eq!(Bitfield::new(4, 4).unwrap().mask(), 0x10);
        assert!(Bitfield::new(8, 0).is_none());
    }

    #[test]
    fn bitfield_insert_extract() {
        let band = Bitfield::new(3, 0).unwrap();
        assert_eq!(band.insert(0xF0, 0x4), 0xF4);
        assert_eq!(band.extract(0xF4), 0x4);
        assert_eq!(band.insert(0x00, 0xFF), 0x0F);
    }
}
