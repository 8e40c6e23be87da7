//! Frequency band selection
//!
//! FS_CFG packs the LO divider band into bits 3:0 and enables the
//! out-of-lock detector with bit 4. Only the six band codes below are valid.

use crate::config::FS_CFG;
use crate::drivers::transceiver::Transceiver;
use crate::error::TcvrResult;
use crate::fmt::debug;
use crate::hal::spi::ByteTransport;
use crate::types::StatusByte;

const BAND_MSB: u8 = 3;
const BAND_LSB: u8 = 0;
const LOCK_DETECTOR_BIT: u8 = 4;

/// LO divider band
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrequencyBand {
    /// 820.0 - 960.0 MHz (divider 4)
    Band820To960,
    /// 410.0 - 480.0 MHz (divider 8)
    Band410To480,
    /// 273.3 - 320.0 MHz (divider 12)
    Band273To320,
    /// 205.0 - 240.0 MHz (divider 16)
    Band205To240,
    /// 164.0 - 192.0 MHz (divider 20)
    Band164To192,
    /// 136.7 - 160.0 MHz (divider 24)
    Band136To160,
}

impl FrequencyBand {
    /// All bands, highest frequency first
    pub const ALL: [Self; 6] = [
        Self::Band820To960,
        Self::Band410To480,
        Self::Band273To320,
        Self::Band205To240,
        Self::Band164To192,
        Self::Band136To160,
    ];

    /// Decode FS_CFG bits 3:0
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x0F {
            0x2 => Some(Self::Band820To960),
            0x4 => Some(Self::Band410To480),
            0x6 => Some(Self::Band273To320),
            0x8 => Some(Self::Band205To240),
            0xA => Some(Self::Band164To192),
            0xB => Some(Self::Band136To160),
            _ => None,
        }
    }

    /// Band select code for FS_CFG bits 3:0
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Band820To960 => 0x2,
            Self::Band410To480 => 0x4,
            Self::Band273To320 => 0x6,
            Self::Band205To240 => 0x8,
            Self::Band164To192 => 0xA,
            Self::Band136To160 => 0xB,
        }
    }

    /// LO divider for this band
    #[must_use]
    pub const fn divider(self) -> u8 {
        match self {
            Self::Band820To960 => 4,
            Self::Band410To480 => 8,
            Self::Band273To320 => 12,
            Self::Band205To240 => 16,
            Self::Band164To192 => 20,
            Self::Band136To160 => 24,
        }
    }

    /// Covered range in MHz, inclusive
    #[must_use]
    pub const fn range_mhz(self) -> (f32, f32) {
        match self {
            Self::Band820To960 => (820.0, 960.0),
            Self::Band410To480 => (410.0, 480.0),
            Self::Band273To320 => (273.3, 320.0),
            Self::Band205To240 => (205.0, 240.0),
            Self::Band164To192 => (164.0, 192.0),
            Self::Band136To160 => (136.7, 160.0),
        }
    }

    /// Band covering `mhz`, if any
    #[must_use]
    pub fn from_frequency_mhz(mhz: f32) -> Option<Self> {
        Self::ALL.into_iter().find(|band| {
            let (low, high) = band.range_mhz();
            (low..=high).contains(&mhz)
        })
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FrequencyBand {
    fn format(&self, f: defmt::Formatter) {
        let (low, high) = self.range_mhz();
        defmt::write!(f, "{=f32}-{=f32} MHz", low, high);
    }
}

impl<T: ByteTransport> Transceiver<T> {
    /// Currently selected band; `None` if FS_CFG holds an invalid code
    ///
    /// # Errors
    /// Propagates register access errors.
    pub fn read_band(&mut self) -> TcvrResult<(Option<FrequencyBand>, StatusByte)> {
        let (bits, status) = self.read_bitfield(FS_CFG, BAND_MSB, BAND_LSB)?;
        Ok((FrequencyBand::from_bits(bits), status))
    }

    /// Select `band`, leaving the lock detector bit alone
    ///
    /// # Errors
    /// Propagates register access errors.
    pub fn set_band(&mut self, band: FrequencyBand) -> TcvrResult<StatusByte> {
        debug!("band select {:#x}", band.bits());
        self.write_bitfield(FS_CFG, band.bits(), BAND_MSB, BAND_LSB)
    }

    /// Whether the out-of-lock detector is enabled
    ///
    /// # Errors
    /// Propagates register access errors.
    pub fn out_of_lock_detector_enabled(&mut self) -> TcvrResult<(bool, StatusByte)> {
        let (bit, status) = self.read_bitfield(FS_CFG, LOCK_DETECTOR_BIT, LOCK_DETECTOR_BIT)?;
        Ok((bit != 0, status))
    }

    /// Enable or disable the out-of-lock detector
    ///
    /// # Errors
    /// Propagates register access errors.
    pub fn set_out_of_lock_detector(&mut self, enabled: bool) -> TcvrResult<StatusByte> {
        self.write_bitfield(
            FS_CFG,
            u8::from(enabled),
            LOCK_DETECTOR_BIT,
            LOCK_DETECTOR_BIT,
        )
    }
}
