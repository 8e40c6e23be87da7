//! Simulated transceiver SPI slave
//!
//! Decodes the bit stream produced by the bit-banged master exactly as the
//! chip would: one data bit per rising clock edge while chip select is low,
//! and one state transition per completed byte. The register files, FIFOs
//! and status byte it keeps are observable so tests can check what a
//! transaction actually did to the device.
//!
//! Malformed traffic never stalls the bus. Addresses past the end of a
//! register space are neither read nor written, and chip select going
//! high discards whatever operation was in progress.

use heapless::Deque;

use crate::config::{
    EXTENDED_REGISTER_SPACE, FIFO_SIZE, NUM_RXBYTES, NUM_TXBYTES, STANDARD_REGISTER_SPACE,
};
use crate::fmt::{debug, trace};
use crate::protocol::{Access, CommandByte, CommandTarget, Granularity, Strobe};
use crate::types::{ChipState, Level, StatusByte};

const NUM_TXBYTES_INDEX: u8 = (NUM_TXBYTES & 0xFF) as u8;
const NUM_RXBYTES_INDEX: u8 = (NUM_RXBYTES & 0xFF) as u8;

/// Register file a cursor points into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    /// Standard registers, 0x00-0x2D
    Standard,
    /// Extended registers, 0x00-0xFE
    Extended,
}

impl Space {
    /// Number of registers in this space
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Standard => STANDARD_REGISTER_SPACE,
            Self::Extended => EXTENDED_REGISTER_SPACE,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Standard => "std",
            Self::Extended => "ext",
        }
    }
}

/// Register currently addressed by an access
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Register file
    pub space: Space,
    /// Index within the file
    pub index: u8,
}

impl Cursor {
    const fn new(space: Space, index: u8) -> Self {
        Self { space, index }
    }

    const fn in_bounds(self) -> bool {
        (self.index as usize) < self.space.size()
    }

    /// Next register, saturating at the last one in the space
    #[must_use]
    const fn advance(self) -> Self {
        if (self.index as usize) + 1 < self.space.size() {
            Self::new(self.space, self.index + 1)
        } else {
            self
        }
    }
}

/// Protocol phase between two completed bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Next byte is a command
    Ready,
    /// Prefix 0x2F seen; next byte is the extended sub-address
    ExtendedSelect {
        /// Direction latched from the prefix
        access: Access,
        /// Granularity latched from the prefix
        granularity: Granularity,
    },
    /// Register value is being shifted out
    SingleRead,
    /// Next byte is stored to the cursor
    SingleWrite(Cursor),
    /// Register values are shifted out from consecutive addresses
    BurstRead(Cursor),
    /// Bytes are stored to consecutive addresses
    BurstWrite(Cursor),
    /// RX FIFO bytes are shifted out
    RxFifoRead(Granularity),
    /// Bytes are pushed into the TX FIFO
    TxFifoWrite(Granularity),
    /// Remaining bytes are ignored until chip select is released
    Absorb,
}

impl Phase {
    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::ExtendedSelect { .. } => "EXTENDED_SELECT",
            Self::SingleRead => "SINGLE_READ",
            Self::SingleWrite(_) => "SINGLE_WRITE",
            Self::BurstRead(_) => "BURST_READ",
            Self::BurstWrite(_) => "BURST_WRITE",
            Self::RxFifoRead(_) => "RX_FIFO_READ",
            Self::TxFifoWrite(_) => "TX_FIFO_WRITE",
            Self::Absorb => "ABSORB",
        }
    }
}

/// Simulated transceiver
pub struct Peripheral {
    phase: Phase,
    output: u8,
    input: u8,
    bit: u8,
    status: StatusByte,
    standard: [u8; STANDARD_REGISTER_SPACE],
    extended: [u8; EXTENDED_REGISTER_SPACE],
    rx_fifo: Deque<u8, FIFO_SIZE>,
    tx_fifo: Deque<u8, FIFO_SIZE>,
    crystal_stable: bool,
}

impl Peripheral {
    /// Power-on state: all registers zero, chip ready and idle
    #[must_use]
    pub const fn new() -> Self {
        let status = StatusByte::new(true, ChipState::Idle);
        Self {
            phase: Phase::Ready,
            output: status.raw(),
            input: 0,
            bit: 7,
            status,
            standard: [0; STANDARD_REGISTER_SPACE],
            extended: [0; EXTENDED_REGISTER_SPACE],
            rx_fifo: Deque::new(),
            tx_fifo: Deque::new(),
            crystal_stable: true,
        }
    }

    /// Handle a rising clock edge while selected
    ///
    /// Samples `mosi` into the current bit of the incoming byte and returns
    /// the level to drive on MISO for that bit. Completing bit 0 runs one
    /// protocol step.
    pub fn clock_edge(&mut self, mosi: Level) -> Level {
        let miso = Level::of_bit(self.output, self.bit);
        if mosi.is_high() {
            self.input |= 1 << self.bit;
        }

        if self.bit == 0 {
            let byte = self.input;
            self.step(byte);
            self.input = 0;
            self.bit = 7;
        } else {
            self.bit -= 1;
        }

        miso
    }

    /// Clock a whole byte in, returning the byte shifted out
    pub fn clock_byte(&mut self, mosi: u8) -> u8 {
        let mut miso = 0u8;
        for bit in (0..8).rev() {
            let level = self.clock_edge(Level::of_bit(mosi, bit));
            miso = (miso << 1) | level.as_bit();
        }
        miso
    }

    /// Chip select released: abort the current access and return to READY
    pub fn deselect(&mut self) {
        if self.phase != Phase::Ready || self.bit != 7 {
            debug!(
                "sim: deselect aborts {} at bit {}",
                self.phase.name(),
                self.bit
            );
        }
        self.reset_to_ready();
        self.input = 0;
        self.bit = 7;
    }

    /// Current protocol phase
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Bit position that the next rising edge exchanges
    #[must_use]
    pub const fn current_bit(&self) -> u8 {
        self.bit
    }

    /// Partially assembled incoming byte
    #[must_use]
    pub const fn pending_input(&self) -> u8 {
        self.input
    }

    /// Persisted status byte
    #[must_use]
    pub const fn status(&self) -> StatusByte {
        self.status
    }

    /// Level SO rests at between bytes while selected: CHIP_RDYn
    #[must_use]
    pub const fn ready_level(&self) -> Level {
        if self.status.chip_ready() {
            Level::Low
        } else {
            Level::High
        }
    }

    /// Standard register value, `None` past the end of the space
    #[must_use]
    pub fn standard_register(&self, index: u8) -> Option<u8> {
        self.standard.get(usize::from(index)).copied()
    }

    /// Extended register value, `None` past the end of the space
    #[must_use]
    pub fn extended_register(&self, index: u8) -> Option<u8> {
        self.load(Cursor::new(Space::Extended, index))
    }

    /// Number of bytes waiting in the RX FIFO
    #[must_use]
    pub fn rx_len(&self) -> usize {
        self.rx_fifo.len()
    }

    /// Number of bytes waiting in the TX FIFO
    #[must_use]
    pub fn tx_len(&self) -> usize {
        self.tx_fifo.len()
    }

    /// Queue bytes as if they had been received over the air.
    /// Returns how many fit.
    pub fn inject_rx(&mut self, bytes: &[u8]) -> usize {
        let queued = bytes
            .iter()
            .take_while(|&&byte| self.rx_fifo.push_back(byte).is_ok())
            .count();
        self.sync_rx_count();
        queued
    }

    /// Remove the oldest byte queued for transmission
    pub fn pop_tx(&mut self) -> Option<u8> {
        let byte = self.tx_fifo.pop_front();
        if byte.is_some() {
            self.sync_tx_count();
        }
        byte
    }

    /// Model a crystal that settles (or never settles) after SRES.
    /// Settling clears CHIP_RDYn straight away.
    pub fn set_crystal_stable(&mut self, stable: bool) {
        self.crystal_stable = stable;
        if stable {
            self.status = StatusByte::new(true, self.status.state());
        }
    }

    fn step(&mut self, byte: u8) {
        let from = self.phase.name();
        self.phase = match self.phase {
            Phase::Ready => self.dispatch(CommandByte::from_raw(byte)),
            Phase::ExtendedSelect {
                access,
                granularity,
            } => self.open_register(Cursor::new(Space::Extended, byte), access, granularity),
            Phase::SingleRead => Phase::Ready,
            Phase::SingleWrite(cursor) => {
                self.store(cursor, byte);
                Phase::Ready
            }
            Phase::BurstRead(cursor) => {
                let next = cursor.advance();
                if let Some(value) = self.load(next) {
                    self.output = value;
                }
                Phase::BurstRead(next)
            }
            Phase::BurstWrite(cursor) => {
                self.store(cursor, byte);
                Phase::BurstWrite(cursor.advance())
            }
            Phase::RxFifoRead(granularity) => {
                if self.rx_fifo.pop_front().is_some() {
                    self.sync_rx_count();
                } else {
                    debug!("sim: RX FIFO underflow");
                    self.set_state(ChipState::RxFifoError);
                }
                match granularity {
                    Granularity::Single => Phase::Ready,
                    Granularity::Burst => {
                        self.output = self.rx_fifo.front().copied().unwrap_or(0);
                        Phase::RxFifoRead(granularity)
                    }
                }
            }
            Phase::TxFifoWrite(granularity) => {
                if self.tx_fifo.push_back(byte).is_ok() {
                    self.sync_tx_count();
                } else {
                    debug!("sim: TX FIFO overflow");
                    self.set_state(ChipState::TxFifoError);
                }
                match granularity {
                    Granularity::Single => Phase::Ready,
                    Granularity::Burst => Phase::TxFifoWrite(granularity),
                }
            }
            Phase::Absorb => Phase::Absorb,
        };

        if self.phase == Phase::Ready {
            self.output = self.status.raw();
        }
        trace!("sim: byte {:#x} {} -> {}", byte, from, self.phase.name());
    }

    fn dispatch(&mut self, command: CommandByte) -> Phase {
        let access = command.access();
        let granularity = command.granularity();

        match command.target() {
            CommandTarget::Register(index) => {
                self.open_register(Cursor::new(Space::Standard, index), access, granularity)
            }
            CommandTarget::ExtendedSelect => Phase::ExtendedSelect {
                access,
                granularity,
            },
            CommandTarget::Strobe(strobe) => {
                self.apply_strobe(strobe);
                Phase::Ready
            }
            CommandTarget::StandardFifo => match access {
                Access::Read => {
                    self.output = self.rx_fifo.front().copied().unwrap_or(0);
                    Phase::RxFifoRead(granularity)
                }
                Access::Write => {
                    self.output = self.status.raw();
                    Phase::TxFifoWrite(granularity)
                }
            },
            CommandTarget::DirectFifo => Phase::Absorb,
            CommandTarget::Unmapped(_) => Phase::Ready,
        }
    }

    fn open_register(&mut self, cursor: Cursor, access: Access, granularity: Granularity) -> Phase {
        match access {
            Access::Read => {
                if let Some(value) = self.load(cursor) {
                    self.output = value;
                }
                match granularity {
                    Granularity::Single => Phase::SingleRead,
                    Granularity::Burst => Phase::BurstRead(cursor),
                }
            }
            Access::Write => {
                self.output = self.status.raw();
                match granularity {
                    Granularity::Single => Phase::SingleWrite(cursor),
                    Granularity::Burst => Phase::BurstWrite(cursor),
                }
            }
        }
    }

    fn apply_strobe(&mut self, strobe: Strobe) {
        debug!("sim: strobe {:#x}", strobe.address());
        match strobe {
            Strobe::Sres => {
                self.standard = [0; STANDARD_REGISTER_SPACE];
                self.extended = [0; EXTENDED_REGISTER_SPACE];
                self.rx_fifo.clear();
                self.tx_fifo.clear();
                self.status = StatusByte::new(self.crystal_stable, ChipState::Idle);
            }
            Strobe::Sidle | Strobe::Scal => self.set_state(ChipState::Idle),
            Strobe::Srx => self.set_state(ChipState::Rx),
            Strobe::Stx => self.set_state(ChipState::Tx),
            Strobe::Sfstxon => self.set_state(ChipState::FastTxReady),
            Strobe::Sfrx => {
                self.rx_fifo.clear();
                self.sync_rx_count();
                if self.status.state() == ChipState::RxFifoError {
                    self.set_state(ChipState::Idle);
                }
            }
            Strobe::Sftx => {
                self.tx_fifo.clear();
                self.sync_tx_count();
                if self.status.state() == ChipState::TxFifoError {
                    self.set_state(ChipState::Idle);
                }
            }
            Strobe::Sxoff
            | Strobe::Safc
            | Strobe::Swor
            | Strobe::Spwd
            | Strobe::Sworrst
            | Strobe::Snop => {}
        }
    }

    fn load(&self, cursor: Cursor) -> Option<u8> {
        if !cursor.in_bounds() {
            return None;
        }
        let index = usize::from(cursor.index);
        match cursor.space {
            Space::Standard => Some(self.standard[index]),
            Space::Extended => Some(self.extended[index]),
        }
    }

    fn store(&mut self, cursor: Cursor, value: u8) {
        if !cursor.in_bounds() {
            return;
        }
        let index = usize::from(cursor.index);
        match cursor.space {
            Space::Standard => self.standard[index] = value,
            Space::Extended => self.extended[index] = value,
        }
        trace!("sim: reg[{}:{:#x}] = {:#x}", cursor.space.name(), cursor.index, value);
    }

    // NUM_TXBYTES/NUM_RXBYTES are plain storage refreshed on every FIFO
    // length change; a master write sticks until the next one.
    fn sync_tx_count(&mut self) {
        self.extended[usize::from(NUM_TXBYTES_INDEX)] = fifo_count(self.tx_fifo.len());
    }

    fn sync_rx_count(&mut self) {
        self.extended[usize::from(NUM_RXBYTES_INDEX)] = fifo_count(self.rx_fifo.len());
    }

    fn set_state(&mut self, state: ChipState) {
        self.status = StatusByte::new(self.status.chip_ready(), state);
    }

    fn reset_to_ready(&mut self) {
        self.phase = Phase::Ready;
        self.output = self.status.raw();
    }
}

impl Default for Peripheral {
    fn default() -> Self {
        Self::new()
    }
}

fn fifo_count(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_saturates_at_end_of_space() {
        let last = Cursor::new(Space::Standard, 0x2D);
        assert_eq!(last.advance(), last);
        let ext = Cursor::new(Space::Extended, 0xFD);
        assert_eq!(ext.advance().index, 0xFE);
        assert_eq!(ext.advance().advance().index, 0xFE);
    }

    #[test]
    fn extended_index_ff_is_out_of_bounds() {
        assert!(!Cursor::new(Space::Extended, 0xFF).in_bounds());
        assert!(Cursor::new(Space::Extended, 0xFE).in_bounds());
    }

    #[test]
    fn bit_counter_wraps_after_eight_edges() {
        let mut chip = Peripheral::new();
        for _ in 0..5 {
            chip.clock_edge(Level::High);
        }
        assert_eq!(chip.current_bit(), 2);
        assert_eq!(chip.pending_input(), 0xF8);
        for _ in 0..3 {
            chip.clock_edge(Level::Low);
        }
        assert_eq!(chip.current_bit(), 7);
        assert_eq!(chip.pending_input(), 0);
    }
}
