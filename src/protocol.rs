//! SPI command/address encoding
//!
//! Every transaction starts with a command byte laid out as
//!
//! ```text
//!   bit 7      bit 6         bits 5..0
//! ┌─────────┬────────────┬──────────────┐
//! │ W/R̄     │ burst      │ address      │
//! └─────────┴────────────┴──────────────┘
//! ```
//!
//! Addresses 0x00-0x2D are standard registers, 0x2F switches the next byte
//! to the 8-bit extended register space, 0x30-0x3D are command strobes and
//! 0x3E/0x3F are the direct and standard FIFOs. This module packs logical
//! [`RegisterAddress`]es into the header bytes a transaction must send, and
//! decodes received command bytes for the simulated peripheral.

use core::fmt;

use heapless::Vec;

use crate::config::{
    DIRECT_FIFO_ADDRESS, EXTENDED_SPACE_SELECTOR, STANDARD_FIFO_ADDRESS,
    STANDARD_REGISTER_SPACE, STROBE_ADDRESS_END, STROBE_ADDRESS_START,
};

/// Mask selecting the 6-bit address field of a command byte
pub const ADDRESS_MASK: u8 = 0x3F;

/// Access direction (bit 7 of the command byte)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// Read from the chip (bit clear)
    Read,
    /// Write to the chip (bit set)
    Write,
}

impl Access {
    const BIT: u8 = 0x80;

    /// Bit pattern contributed to a command byte
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Read => 0,
            Self::Write => Self::BIT,
        }
    }

    /// Decode from a command byte
    #[must_use]
    pub const fn from_command(byte: u8) -> Self {
        if byte & Self::BIT != 0 {
            Self::Write
        } else {
            Self::Read
        }
    }
}

/// Single or burst access (bit 6 of the command byte)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One data byte
    Single,
    /// Consecutive registers, address auto-increments in the chip
    Burst,
}

impl Granularity {
    const BIT: u8 = 0x40;

    /// Bit pattern contributed to a command byte
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Single => 0,
            Self::Burst => Self::BIT,
        }
    }

    /// Decode from a command byte
    #[must_use]
    pub const fn from_command(byte: u8) -> Self {
        if byte & Self::BIT != 0 {
            Self::Burst
        } else {
            Self::Single
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Access {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Read => defmt::write!(f, "R"),
            Self::Write => defmt::write!(f, "W"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Granularity {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Single => defmt::write!(f, "single"),
            Self::Burst => defmt::write!(f, "burst"),
        }
    }
}

/// Command strobes, 0x30-0x3D
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Strobe {
    /// Reset chip
    Sres = 0x30,
    /// Enable and calibrate frequency synthesizer
    Sfstxon = 0x31,
    /// Enter XOFF state when CSn is de-asserted
    Sxoff = 0x32,
    /// Calibrate frequency synthesizer and turn it off
    Scal = 0x33,
    /// Enable RX
    Srx = 0x34,
    /// Enable TX
    Stx = 0x35,
    /// Exit RX/TX, turn off frequency synthesizer
    Sidle = 0x36,
    /// Automatic frequency compensation
    Safc = 0x37,
    /// Start automatic RX polling sequence
    Swor = 0x38,
    /// Enter SLEEP mode when CSn is de-asserted
    Spwd = 0x39,
    /// Flush the RX FIFO
    Sfrx = 0x3A,
    /// Flush the TX FIFO
    Sftx = 0x3B,
    /// Reset the eWOR timer
    Sworrst = 0x3C,
    /// No operation, returns the status byte
    Snop = 0x3D,
}

impl Strobe {
    /// All strobes in address order
    pub const ALL: [Self; 14] = [
        Self::Sres,
        Self::Sfstxon,
        Self::Sxoff,
        Self::Scal,
        Self::Srx,
        Self::Stx,
        Self::Sidle,
        Self::Safc,
        Self::Swor,
        Self::Spwd,
        Self::Sfrx,
        Self::Sftx,
        Self::Sworrst,
        Self::Snop,
    ];

    /// Look up a strobe by its 6-bit address
    #[must_use]
    pub fn from_address(address: u8) -> Option<Self> {
        if (STROBE_ADDRESS_START..=STROBE_ADDRESS_END).contains(&address) {
            Some(Self::ALL[usize::from(address - STROBE_ADDRESS_START)])
        } else {
            None
        }
    }

    /// Strobe address
    #[must_use]
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Command byte issuing this strobe: the bare address, no flag bits
    #[must_use]
    pub const fn command(self) -> CommandByte {
        CommandByte::from_raw(self.address())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Strobe {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "strobe({=u8:#x})", self.address());
    }
}

/// What the address field of a received command byte selects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandTarget {
    /// Standard-space register index
    Register(u8),
    /// Extended-space selector; the next byte is the sub-address
    ExtendedSelect,
    /// Command strobe
    Strobe(Strobe),
    /// Direct FIFO access (0x3E)
    DirectFifo,
    /// Standard FIFO access (0x3F)
    StandardFifo,
    /// Address with no function (0x2E)
    Unmapped(u8),
}

/// A command byte: direction, granularity and 6-bit address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandByte(u8);

impl CommandByte {
    /// Pack a command byte; the address is truncated to 6 bits
    #[must_use]
    pub const fn new(access: Access, granularity: Granularity, address: u8) -> Self {
        Self(access.bits() | granularity.bits() | (address & ADDRESS_MASK))
    }

    /// Interpret a raw byte as a command
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw byte to put on the wire
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Direction bit
    #[must_use]
    pub const fn access(self) -> Access {
        Access::from_command(self.0)
    }

    /// Burst bit
    #[must_use]
    pub const fn granularity(self) -> Granularity {
        Granularity::from_command(self.0)
    }

    /// 6-bit address field
    #[must_use]
    pub const fn address(self) -> u8 {
        self.0 & ADDRESS_MASK
    }

    /// Classify the address field
    #[must_use]
    pub fn target(self) -> CommandTarget {
        let address = self.address();
        if usize::from(address) < STANDARD_REGISTER_SPACE {
            CommandTarget::Register(address)
        } else if address == EXTENDED_SPACE_SELECTOR {
            CommandTarget::ExtendedSelect
        } else if let Some(strobe) = Strobe::from_address(address) {
            CommandTarget::Strobe(strobe)
        } else if address == DIRECT_FIFO_ADDRESS {
            CommandTarget::DirectFifo
        } else if address == STANDARD_FIFO_ADDRESS {
            CommandTarget::StandardFifo
        } else {
            CommandTarget::Unmapped(address)
        }
    }
}

impl fmt::Debug for CommandByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CommandByte({:#04x}: {:?} {:?} @{:#04x})",
            self.0,
            self.access(),
            self.granularity(),
            self.address()
        )
    }
}

/// Address space a [`RegisterAddress`] lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressSpace {
    /// Standard register, index 0x00-0x2D
    Standard(u8),
    /// Extended register, sub-address 0x00-0xFF
    Extended(u8),
    /// Direct FIFO (0x3E)
    DirectFifo,
    /// Standard FIFO (0x3F)
    StandardFifo,
    /// Not a register: strobes, 0x2E, or anything else
    Unmapped,
}

/// Logical 16-bit register name
///
/// `0x00xx` below 0x2E names a standard register, `0x2Fxx` names extended
/// register `xx`, and 0x3E/0x3F are the FIFOs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterAddress(u16);

impl RegisterAddress {
    /// Wrap a raw register name
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Standard register by index
    #[must_use]
    pub const fn standard(index: u8) -> Option<Self> {
        if (index as usize) < STANDARD_REGISTER_SPACE {
            Some(Self(index as u16))
        } else {
            None
        }
    }

    /// Extended register by sub-address
    #[must_use]
    pub const fn extended(sub: u8) -> Self {
        Self(((EXTENDED_SPACE_SELECTOR as u16) << 8) | sub as u16)
    }

    /// Raw 16-bit name
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// True when the upper byte is the extended-space selector
    #[must_use]
    pub const fn is_extended(self) -> bool {
        (self.0 >> 8) as u8 == EXTENDED_SPACE_SELECTOR
    }

    /// Classify the address
    #[must_use]
    pub const fn space(self) -> AddressSpace {
        if self.is_extended() {
            AddressSpace::Extended((self.0 & 0xFF) as u8)
        } else if (self.0 as usize) < STANDARD_REGISTER_SPACE {
            AddressSpace::Standard(self.0 as u8)
        } else if self.0 == DIRECT_FIFO_ADDRESS as u16 {
            AddressSpace::DirectFifo
        } else if self.0 == STANDARD_FIFO_ADDRESS as u16 {
            AddressSpace::StandardFifo
        } else {
            AddressSpace::Unmapped
        }
    }

    /// True for standard or extended registers
    #[must_use]
    pub const fn is_register(self) -> bool {
        matches!(self.space(), AddressSpace::Standard(_) | AddressSpace::Extended(_))
    }
}

impl fmt::Debug for RegisterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegisterAddress({:#06x})", self.0)
    }
}

impl From<u16> for RegisterAddress {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RegisterAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=u16:#x}", self.0);
    }
}

/// Header bytes that open an access: the command byte, preceded by the
/// extended-space prefix when needed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    prefix: Option<CommandByte>,
    bytes: Vec<u8, 2>,
}

impl Header {
    /// Encode the header for an access; `None` for unmapped addresses
    #[must_use]
    pub fn encode(
        address: RegisterAddress,
        access: Access,
        granularity: Granularity,
    ) -> Option<Self> {
        let mut bytes = Vec::new();
        let prefix = match address.space() {
            AddressSpace::Standard(index) => {
                bytes.push(CommandByte::new(access, granularity, index).raw()).ok()?;
                None
            }
            AddressSpace::Extended(sub) => {
                let prefix = CommandByte::new(access, granularity, EXTENDED_SPACE_SELECTOR);
                bytes.push(prefix.raw()).ok()?;
                bytes.push(sub).ok()?;
                Some(prefix)
            }
            AddressSpace::DirectFifo => {
                bytes
                    .push(CommandByte::new(access, granularity, DIRECT_FIFO_ADDRESS).raw())
                    .ok()?;
                None
            }
            AddressSpace::StandardFifo => {
                bytes
                    .push(CommandByte::new(access, granularity, STANDARD_FIFO_ADDRESS).raw())
                    .ok()?;
                None
            }
            AddressSpace::Unmapped => return None,
        };
        Some(Self { prefix, bytes })
    }

    /// Header made of a single command byte
    #[must_use]
    pub fn command(command: CommandByte) -> Self {
        let mut bytes = Vec::new();
        // Capacity 2, cannot fail on an empty vector
        let _ = bytes.push(command.raw());
        Self {
            prefix: None,
            bytes,
        }
    }

    /// Extended-space prefix, if any
    #[must_use]
    pub const fn prefix(&self) -> Option<CommandByte> {
        self.prefix
    }

    /// Final header byte: the command byte, or the extended sub-address
    #[must_use]
    pub fn last(&self) -> u8 {
        self.bytes.last().copied().unwrap_or_default()
    }

    /// Bytes to send, in order
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}
