//! RX/TX FIFO access
//!
//! Queue lengths are read from the NUM_RXBYTES/NUM_TXBYTES extended
//! registers before touching a FIFO, so an empty RX or full TX queue is
//! refused instead of under/overflowing the chip.

use crate::config::{FIFO_SIZE, NUM_RXBYTES, NUM_TXBYTES, STANDARD_FIFO_ADDRESS};
use crate::drivers::transceiver::{send_header, Transceiver};
use crate::error::{TcvrError, TcvrResult};
use crate::hal::spi::ByteTransport;
use crate::protocol::{Access, CommandByte, Granularity, Header};
use crate::types::StatusByte;

fn fifo_header(access: Access, granularity: Granularity) -> Header {
    Header::command(CommandByte::new(access, granularity, STANDARD_FIFO_ADDRESS))
}

impl<T: ByteTransport> Transceiver<T> {
    /// Number of bytes waiting in the RX FIFO
    ///
    /// # Errors
    /// Propagates register access errors.
    pub fn rx_queue_len(&mut self) -> TcvrResult<(u8, StatusByte)> {
        self.read_register(NUM_RXBYTES)
    }

    /// Number of bytes waiting in the TX FIFO
    ///
    /// # Errors
    /// Propagates register access errors.
    pub fn tx_queue_len(&mut self) -> TcvrResult<(u8, StatusByte)> {
        self.read_register(NUM_TXBYTES)
    }

    /// Pop one received byte
    ///
    /// # Errors
    /// `RxFifoEmpty` if nothing has been received.
    pub fn rx_dequeue(&mut self) -> TcvrResult<(u8, StatusByte)> {
        let (queued, _) = self.rx_queue_len()?;
        if queued == 0 {
            return Err(TcvrError::RxFifoEmpty);
        }

        let header = fifo_header(Access::Read, Granularity::Single);
        Ok(self.bus_mut().transaction(|bus| {
            let status = send_header(bus, &header);
            let value = bus.transfer(0);
            (value, status)
        }))
    }

    /// Queue one byte for transmission
    ///
    /// # Errors
    /// `TxFifoFull` if the TX FIFO is at capacity.
    pub fn tx_enqueue(&mut self, byte: u8) -> TcvrResult<StatusByte> {
        let (queued, _) = self.tx_queue_len()?;
        if usize::from(queued) >= FIFO_SIZE {
            return Err(TcvrError::TxFifoFull);
        }

        let header = fifo_header(Access::Write, Granularity::Single);
        Ok(self.bus_mut().transaction(|bus| {
            let status = send_header(bus, &header);
            bus.transfer(byte);
            status
        }))
    }

    /// Pop up to `buf.len()` received bytes, clamped to what is queued.
    /// Returns how many bytes were read.
    ///
    /// # Errors
    /// Propagates register access errors.
    pub fn rx_burst_dequeue(&mut self, buf: &mut [u8]) -> TcvrResult<(usize, StatusByte)> {
        let (queued, status) = self.rx_queue_len()?;
        let count = buf.len().min(usize::from(queued));
        if count == 0 {
            return Ok((0, status));
        }

        let header = fifo_header(Access::Read, Granularity::Burst);
        let status = self.bus_mut().transaction(|bus| {
            let status = send_header(bus, &header);
            for slot in &mut buf[..count] {
                *slot = bus.transfer(0);
            }
            status
        });
        Ok((count, status))
    }

    /// Queue `data` for transmission in one burst
    ///
    /// # Errors
    /// `ParameterOutOfRange` for empty `data`, `TxFifoFull` if it would not
    /// fit in the TX FIFO.
    pub fn tx_burst_enqueue(&mut self, data: &[u8]) -> TcvrResult<StatusByte> {
        if data.is_empty() {
            return Err(TcvrError::ParameterOutOfRange);
        }
        let (queued, _) = self.tx_queue_len()?;
        if usize::from(queued) + data.len() > FIFO_SIZE {
            return Err(TcvrError::TxFifoFull);
        }

        let header = fifo_header(Access::Write, Granularity::Burst);
        Ok(self.bus_mut().transaction(|bus| {
            let status = send_header(bus, &header);
            for &byte in data {
                bus.transfer(byte);
            }
            status
        }))
    }
}
