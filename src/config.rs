//! System configuration and hardware constants
//!
//! Compile-time constants for the transceiver's SPI address map, the
//! bit-banged bus timing and the board pin assignment. Runtime-tunable
//! values are grouped into [`BusTiming`] and [`ResetPolicy`], whose
//! defaults come from the constants below.

/// Number of registers in standard space (0x00-0x2D)
pub const STANDARD_REGISTER_SPACE: usize = 0x2E;

/// Number of registers in extended space (0x00-0xFE)
pub const EXTENDED_REGISTER_SPACE: usize = 0xFF;

/// Command address that switches the following byte to extended space
pub const EXTENDED_SPACE_SELECTOR: u8 = 0x2F;

/// First command strobe address (SRES)
pub const STROBE_ADDRESS_START: u8 = 0x30;

/// Last command strobe address (SNOP)
pub const STROBE_ADDRESS_END: u8 = 0x3D;

/// Direct FIFO access address
pub const DIRECT_FIFO_ADDRESS: u8 = 0x3E;

/// Standard FIFO access address
pub const STANDARD_FIFO_ADDRESS: u8 = 0x3F;

/// Capacity of each of the RX and TX FIFOs
pub const FIFO_SIZE: usize = 128;

/// Frequency synthesizer configuration register
pub const FS_CFG: u16 = 0x0021;

/// Number of bytes in the TX FIFO (extended register)
pub const NUM_TXBYTES: u16 = 0x2FD6;

/// Number of bytes in the RX FIFO (extended register)
pub const NUM_RXBYTES: u16 = 0x2FD7;

/// Data setup time before the rising clock edge, in nanoseconds
pub const SPI_SETTLE_NS: u32 = 100;

/// Data hold time after sampling, in nanoseconds
pub const SPI_HOLD_NS: u32 = 100;

/// Chip-select setup/hold time, in nanoseconds
pub const SPI_SELECT_NS: u32 = 100;

/// Maximum number of data-in polls while waiting for a reset to finish
pub const RESET_MAX_POLLS: u32 = 10_000;

/// Pause between data-in polls during reset, in nanoseconds
pub const RESET_POLL_INTERVAL_NS: u32 = 1_000;

/// Bit-banged bus timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusTiming {
    /// Delay between driving data-out and raising the clock
    pub settle_ns: u32,
    /// Delay between sampling data-in and lowering the clock
    pub hold_ns: u32,
    /// Delay after each chip-select transition
    pub select_ns: u32,
}

impl BusTiming {
    /// No delays at all (for simulated lines)
    pub const INSTANT: Self = Self {
        settle_ns: 0,
        hold_ns: 0,
        select_ns: 0,
    };
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            settle_ns: SPI_SETTLE_NS,
            hold_ns: SPI_HOLD_NS,
            select_ns: SPI_SELECT_NS,
        }
    }
}

/// Bounded wait applied to a chip reset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetPolicy {
    /// Polls of the data-in line before giving up
    pub max_polls: u32,
    /// Pause between polls
    pub poll_interval_ns: u32,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self {
            max_polls: RESET_MAX_POLLS,
            poll_interval_ns: RESET_POLL_INTERVAL_NS,
        }
    }
}

/// Pin assignments for the bit-banged bus
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// Status LED (directly on MCU)
    pub const LED_STATUS: &str = "PA5";

    /// Master out, transceiver SI
    pub const SPI_MOSI: &str = "PB15";

    /// Master in, transceiver SO
    pub const SPI_MISO: &str = "PB14";

    /// Serial clock
    pub const SPI_SCLK: &str = "PB13";

    /// Chip select, active low (CSn)
    pub const SPI_CSN: &str = "PB12";
}
