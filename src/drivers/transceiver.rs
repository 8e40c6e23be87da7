//! Transceiver register driver
//!
//! Single and burst register access, read-modify-write of bitfields,
//! command strobes and the chip reset sequence. Every call is one complete
//! SPI transaction: chip select is always released before returning, even
//! on the error paths.

use crate::config::ResetPolicy;
use crate::error::{TcvrError, TcvrResult};
use crate::fmt::{debug, trace, warn};
use crate::hal::spi::ByteTransport;
use crate::protocol::{Access, Granularity, Header, RegisterAddress, Strobe};
use crate::types::{Bitfield, StatusByte};

/// Driver for the transceiver behind a [`ByteTransport`]
pub struct Transceiver<T> {
    bus: T,
    reset: ResetPolicy,
}

impl<T: ByteTransport> Transceiver<T> {
    /// Create a driver over `bus`
    #[must_use]
    pub fn new(bus: T) -> Self {
        Self {
            bus,
            reset: ResetPolicy::default(),
        }
    }

    /// Replace the reset wait budget
    #[must_use]
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset = policy;
        self
    }

    /// Access the underlying transport
    pub fn bus_mut(&mut self) -> &mut T {
        &mut self.bus
    }

    /// Give the transport back
    pub fn release(self) -> T {
        self.bus
    }

    /// Read one register, returning `(value, status)`
    ///
    /// # Errors
    /// `InvalidRegister` if the address is not a standard or extended register.
    pub fn read_register(
        &mut self,
        address: impl Into<RegisterAddress>,
    ) -> TcvrResult<(u8, StatusByte)> {
        let header = register_header(address.into(), Access::Read, Granularity::Single)?;
        Ok(self.bus.transaction(|bus| {
            let status = send_header(bus, &header);
            let value = bus.transfer(0);
            (value, status)
        }))
    }

    /// Write one register, returning the status clocked out with the data
    ///
    /// # Errors
    /// `InvalidRegister` if the address is not a standard or extended register.
    pub fn write_register(
        &mut self,
        address: impl Into<RegisterAddress>,
        value: u8,
    ) -> TcvrResult<StatusByte> {
        let header = register_header(address.into(), Access::Write, Granularity::Single)?;
        Ok(self.bus.transaction(|bus| {
            send_header(bus, &header);
            StatusByte::from_raw(bus.transfer(value))
        }))
    }

    /// Read `buf.len()` consecutive registers starting at `address`
    ///
    /// # Errors
    /// `InvalidRegister` for a non-register address, `ParameterOutOfRange`
    /// if fewer than two bytes are requested.
    pub fn burst_read(
        &mut self,
        address: impl Into<RegisterAddress>,
        buf: &mut [u8],
    ) -> TcvrResult<StatusByte> {
        let header = register_header(address.into(), Access::Read, Granularity::Burst)?;
        if buf.len() <= 1 {
            return Err(TcvrError::ParameterOutOfRange);
        }
        Ok(self.bus.transaction(|bus| {
            let status = send_header(bus, &header);
            for slot in buf.iter_mut() {
                *slot = bus.transfer(0);
            }
            status
        }))
    }

    /// Write `data` to consecutive registers starting at `address`
    ///
    /// Returns the status clocked out with the last data byte.
    ///
    /// # Errors
    /// `InvalidRegister` for a non-register address, `ParameterOutOfRange`
    /// if fewer than two bytes are given.
    pub fn burst_write(
        &mut self,
        address: impl Into<RegisterAddress>,
        data: &[u8],
    ) -> TcvrResult<StatusByte> {
        let header = register_header(address.into(), Access::Write, Granularity::Burst)?;
        if data.len() <= 1 {
            return Err(TcvrError::ParameterOutOfRange);
        }
        Ok(self.bus.transaction(|bus| {
            let mut status = send_header(bus, &header);
            for &byte in data {
                status = StatusByte::from_raw(bus.transfer(byte));
            }
            status
        }))
    }

    /// Read the bitfield spanning bit positions `a..=b` (either order),
    /// shifted down to bit 0
    ///
    /// # Errors
    /// `InvalidRegister` for a non-register address, `ParameterOutOfRange`
    /// for a bit position above 7.
    pub fn read_bitfield(
        &mut self,
        address: impl Into<RegisterAddress>,
        a: u8,
        b: u8,
    ) -> TcvrResult<(u8, StatusByte)> {
        let field = Bitfield::new(a, b).ok_or(TcvrError::ParameterOutOfRange)?;
        let (value, status) = self.read_register(address)?;
        Ok((field.extract(value), status))
    }

    /// Replace the bitfield spanning `a..=b` with `value`, leaving the
    /// other bits of the register untouched
    ///
    /// # Errors
    /// `InvalidRegister` for a non-register address, `ParameterOutOfRange`
    /// for a bit position above 7.
    pub fn write_bitfield(
        &mut self,
        address: impl Into<RegisterAddress>,
        value: u8,
        a: u8,
        b: u8,
    ) -> TcvrResult<StatusByte> {
        let address = address.into();
        let field = Bitfield::new(a, b).ok_or(TcvrError::ParameterOutOfRange)?;
        let (old, _) = self.read_register(address)?;
        self.write_register(address, field.insert(old, value))
    }

    /// Issue a command strobe
    ///
    /// `Sres` goes through [`reset`](Self::reset) and its bounded wait.
    ///
    /// # Errors
    /// `PeripheralUnresponsive` if a reset does not complete in time.
    pub fn strobe(&mut self, strobe: Strobe) -> TcvrResult<StatusByte> {
        if strobe == Strobe::Sres {
            return self.reset();
        }
        trace!("strobe {:#x}", strobe.address());
        Ok(self
            .bus
            .transaction(|bus| StatusByte::from_raw(bus.transfer(strobe.command().raw()))))
    }

    /// Issue a command strobe by its raw address
    ///
    /// # Errors
    /// `InvalidStrobe` if `address` is not 0x30-0x3D, plus the errors of
    /// [`strobe`](Self::strobe).
    pub fn strobe_address(&mut self, address: u8) -> TcvrResult<StatusByte> {
        let strobe = Strobe::from_address(address).ok_or(TcvrError::InvalidStrobe(address))?;
        self.strobe(strobe)
    }

    /// Send SRES and wait for the chip to pull SO low
    ///
    /// The transaction stays open while data-in is polled, at most
    /// `max_polls` times.
    ///
    /// # Errors
    /// `PeripheralUnresponsive` if SO is still high after the poll budget;
    /// chip select is released first.
    pub fn reset(&mut self) -> TcvrResult<StatusByte> {
        let policy = self.reset;
        debug!("resetting transceiver");

        self.bus.open_transaction();
        let status = StatusByte::from_raw(self.bus.transfer(Strobe::Sres.command().raw()));

        let mut polls = 0u32;
        while self.bus.data_in_is_high() {
            if polls >= policy.max_polls {
                self.bus.close_transaction();
                warn!("reset: SO still high after {} polls", polls);
                return Err(TcvrError::PeripheralUnresponsive);
            }
            polls += 1;
            self.bus.pause_ns(policy.poll_interval_ns);
        }

        self.bus.close_transaction();
        debug!("reset complete after {} polls", polls);
        Ok(status)
    }

    /// Read the status byte without side effects (SNOP)
    ///
    /// # Errors
    /// Never fails; kept fallible for symmetry with [`strobe`](Self::strobe).
    pub fn status(&mut self) -> TcvrResult<StatusByte> {
        self.strobe(Strobe::Snop)
    }
}

fn register_header(
    address: RegisterAddress,
    access: Access,
    granularity: Granularity,
) -> TcvrResult<Header> {
    if !address.is_register() {
        return Err(TcvrError::InvalidRegister(address.raw()));
    }
    Header::encode(address, access, granularity).ok_or(TcvrError::InvalidRegister(address.raw()))
}

/// Send header bytes; the status byte comes back with the first of them
pub(crate) fn send_header<T: ByteTransport>(bus: &mut T, header: &Header) -> StatusByte {
    let mut bytes = header.as_slice().iter();
    let status = bytes.next().map_or(0, |&first| bus.transfer(first));
    for &byte in bytes {
        bus.transfer(byte);
    }
    StatusByte::from_raw(status)
}
