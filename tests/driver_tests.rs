//! Tests for the transceiver register driver
//!
//! Every test runs the driver against a simulated session, so the bytes
//! it sends go through the bit-banged master and the peripheral model.

use tcvr_firmware::config::{ResetPolicy, FIFO_SIZE, FS_CFG, NUM_RXBYTES, NUM_TXBYTES};
use tcvr_firmware::drivers::{FrequencyBand, Transceiver};
use tcvr_firmware::error::TcvrError;
use tcvr_firmware::protocol::{RegisterAddress, Strobe};
use tcvr_firmware::sim::{Line, SimSession, SimSpi};
use tcvr_firmware::types::{ChipState, Level};

fn radio(session: &SimSession) -> Transceiver<SimSpi<'_>> {
    Transceiver::new(session.transport())
}

// ============================================================================
// Register Access Tests
// ============================================================================

#[test]
fn write_then_read_standard_register() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    let status = radio.write_register(0x0001u16, 0xFF).unwrap();
    assert!(status.chip_ready());
    assert_eq!(session.standard_register(1), Some(0xFF));

    let (value, status) = radio.read_register(0x0001u16).unwrap();
    assert_eq!(value, 0xFF);
    assert_eq!(status.state(), ChipState::Idle);
}

#[test]
fn write_then_read_extended_register() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.write_register(RegisterAddress::extended(0x0A), 0x5A).unwrap();
    assert_eq!(session.extended_register(0x0A), Some(0x5A));
    assert_eq!(session.standard_register(0x0A), Some(0x00));
    assert_eq!(radio.read_register(0x2F0Au16).unwrap().0, 0x5A);
}

#[test]
fn non_register_addresses_are_rejected() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    assert_eq!(
        radio.read_register(0x002Eu16),
        Err(TcvrError::InvalidRegister(0x002E))
    );
    assert_eq!(
        radio.write_register(0x0030u16, 0),
        Err(TcvrError::InvalidRegister(0x0030))
    );
    assert_eq!(
        radio.read_register(0x003Fu16),
        Err(TcvrError::InvalidRegister(0x003F))
    );
    assert_eq!(
        radio.burst_read(0x1234u16, &mut [0; 2]),
        Err(TcvrError::InvalidRegister(0x1234))
    );
    // Rejected before any traffic
    assert_eq!(session.level(Line::Csn), Level::High);
}

#[test]
fn burst_round_trip() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.burst_write(0x0010u16, &[1, 2, 3, 4]).unwrap();
    let mut buf = [0u8; 4];
    radio.burst_read(0x0010u16, &mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3, 4]);
}

#[test]
fn burst_length_of_one_or_less_is_out_of_range() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    assert_eq!(
        radio.burst_write(0x0010u16, &[1]),
        Err(TcvrError::ParameterOutOfRange)
    );
    assert_eq!(
        radio.burst_write(0x0010u16, &[]),
        Err(TcvrError::ParameterOutOfRange)
    );
    assert_eq!(
        radio.burst_read(0x0010u16, &mut [0; 1]),
        Err(TcvrError::ParameterOutOfRange)
    );
}

// ============================================================================
// Bitfield Tests
// ============================================================================

#[test]
fn bitfield_read_modify_write() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.write_register(0x0005u16, 0b1010_0101).unwrap();
    radio.write_bitfield(0x0005u16, 0b11, 4, 3).unwrap();
    assert_eq!(session.standard_register(5), Some(0b1011_1101));

    let (field, _) = radio.read_bitfield(0x0005u16, 3, 4).unwrap();
    assert_eq!(field, 0b11);
}

#[test]
fn bitfield_value_is_masked() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.write_bitfield(0x0006u16, 0xFF, 1, 0).unwrap();
    assert_eq!(session.standard_register(6), Some(0b0000_0011));
}

#[test]
fn bitfield_position_out_of_range() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    assert_eq!(
        radio.read_bitfield(0x0005u16, 8, 0),
        Err(TcvrError::ParameterOutOfRange)
    );
    assert_eq!(
        radio.write_bitfield(0x0005u16, 1, 0, 9),
        Err(TcvrError::ParameterOutOfRange)
    );
}

// ============================================================================
// Strobe And Reset Tests
// ============================================================================

#[test]
fn strobes_drive_the_state_machine() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.strobe(Strobe::Srx).unwrap();
    assert_eq!(session.status().state(), ChipState::Rx);

    let status = radio.status().unwrap();
    assert_eq!(status.state(), ChipState::Rx);

    radio.strobe_address(0x36).unwrap();
    assert_eq!(session.status().state(), ChipState::Idle);
}

#[test]
fn unknown_strobe_address_is_rejected() {
    let session = SimSession::new();
    let mut radio = radio(&session);
    assert_eq!(radio.strobe_address(0x2F), Err(TcvrError::InvalidStrobe(0x2F)));
    assert_eq!(radio.strobe_address(0x3E), Err(TcvrError::InvalidStrobe(0x3E)));
}

#[test]
fn reset_clears_the_chip() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.write_register(0x0001u16, 0x42).unwrap();
    radio.strobe(Strobe::Stx).unwrap();
    radio.reset().unwrap();

    assert_eq!(session.standard_register(1), Some(0));
    assert_eq!(session.status().state(), ChipState::Idle);
    assert_eq!(session.level(Line::Csn), Level::High);
}

#[test]
fn sres_strobe_goes_through_reset() {
    let session = SimSession::new();
    session.set_crystal_stable(false);
    let mut radio = radio(&session).with_reset_policy(ResetPolicy {
        max_polls: 3,
        poll_interval_ns: 0,
    });
    assert_eq!(
        radio.strobe(Strobe::Sres),
        Err(TcvrError::PeripheralUnresponsive)
    );
}

#[test]
fn reset_times_out_when_crystal_never_settles() {
    let session = SimSession::new();
    session.set_crystal_stable(false);
    let mut radio = radio(&session).with_reset_policy(ResetPolicy {
        max_polls: 16,
        poll_interval_ns: 0,
    });

    assert_eq!(radio.reset(), Err(TcvrError::PeripheralUnresponsive));
    // Chip select is released even on the failure path
    assert_eq!(session.level(Line::Csn), Level::High);
    assert!(!session.status().chip_ready());

    session.set_crystal_stable(true);
    assert!(radio.reset().is_ok());
}

#[test]
fn reset_completes_when_crystal_settles_mid_poll() {
    let session = SimSession::new();
    session.set_crystal_stable(false);

    std::thread::scope(|s| {
        s.spawn(|| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            session.set_crystal_stable(true);
        });

        let mut radio = radio(&session).with_reset_policy(ResetPolicy {
            max_polls: u32::MAX,
            poll_interval_ns: 0,
        });
        assert!(radio.reset().is_ok());
    });

    assert!(session.status().chip_ready());
    assert_eq!(session.level(Line::Csn), Level::High);
}

#[test]
fn registers_round_trip_after_a_failed_reset() {
    let session = SimSession::new();
    session.set_crystal_stable(false);
    let mut radio = radio(&session).with_reset_policy(ResetPolicy {
        max_polls: 3,
        poll_interval_ns: 0,
    });
    assert_eq!(radio.reset(), Err(TcvrError::PeripheralUnresponsive));

    radio.write_register(0x0002u16, 0x40).unwrap();
    let (value, status) = radio.read_register(0x0002u16).unwrap();
    assert_eq!(value, 0x40);
    assert!(!status.chip_ready());
}

#[test]
fn fifo_count_register_write_reads_back() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.write_register(NUM_TXBYTES, 0x55).unwrap();
    assert_eq!(radio.read_register(NUM_TXBYTES).unwrap().0, 0x55);

    radio.tx_enqueue(0xA1).unwrap();
    assert_eq!(radio.tx_queue_len().unwrap().0, 1);
}

// ============================================================================
// FIFO Tests
// ============================================================================

#[test]
fn rx_dequeue_pops_in_order() {
    let session = SimSession::new();
    session.inject_rx(&[0x11, 0x22]);
    let mut radio = radio(&session);

    assert_eq!(radio.rx_queue_len().unwrap().0, 2);
    assert_eq!(radio.rx_dequeue().unwrap().0, 0x11);
    assert_eq!(radio.rx_dequeue().unwrap().0, 0x22);
    assert_eq!(radio.rx_dequeue(), Err(TcvrError::RxFifoEmpty));
}

#[test]
fn rx_burst_dequeue_is_clamped_to_queue() {
    let session = SimSession::new();
    session.inject_rx(&[1, 2, 3]);
    let mut radio = radio(&session);

    let mut buf = [0u8; 8];
    let (count, _) = radio.rx_burst_dequeue(&mut buf).unwrap();
    assert_eq!(count, 3);
    assert_eq!(&buf[..3], &[1, 2, 3]);
    assert_eq!(radio.read_register(NUM_RXBYTES).unwrap().0, 0);

    let (count, _) = radio.rx_burst_dequeue(&mut buf).unwrap();
    assert_eq!(count, 0);
}

#[test]
fn tx_enqueue_and_burst() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.tx_enqueue(0xA1).unwrap();
    radio.tx_burst_enqueue(&[0xB1, 0xB2]).unwrap();
    assert_eq!(radio.tx_queue_len().unwrap().0, 3);
    assert_eq!(session.drain_tx(), vec![0xA1, 0xB1, 0xB2]);
}

#[test]
fn tx_fifo_full_is_refused() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    let fill = [0x55u8; FIFO_SIZE - 1];
    radio.tx_burst_enqueue(&fill).unwrap();
    assert_eq!(
        radio.tx_burst_enqueue(&[1, 2]),
        Err(TcvrError::TxFifoFull)
    );
    radio.tx_enqueue(0x66).unwrap();
    assert_eq!(radio.tx_enqueue(0x77), Err(TcvrError::TxFifoFull));
    assert_eq!(session.drain_tx().len(), FIFO_SIZE);
}

#[test]
fn empty_burst_enqueue_is_out_of_range() {
    let session = SimSession::new();
    let mut radio = radio(&session);
    assert_eq!(
        radio.tx_burst_enqueue(&[]),
        Err(TcvrError::ParameterOutOfRange)
    );
}

// ============================================================================
// Frequency Band Tests
// ============================================================================

#[test]
fn band_select_round_trip() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    for band in FrequencyBand::ALL {
        radio.set_band(band).unwrap();
        assert_eq!(radio.read_band().unwrap().0, Some(band));
    }
}

#[test]
fn band_select_preserves_other_bits() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.write_register(FS_CFG, 0xE0).unwrap();
    radio.set_band(FrequencyBand::Band410To480).unwrap();
    assert_eq!(session.standard_register(0x21), Some(0xE4));

    radio.set_out_of_lock_detector(true).unwrap();
    assert_eq!(session.standard_register(0x21), Some(0xF4));
    assert!(radio.out_of_lock_detector_enabled().unwrap().0);

    radio.set_out_of_lock_detector(false).unwrap();
    assert!(!radio.out_of_lock_detector_enabled().unwrap().0);
    assert_eq!(radio.read_band().unwrap().0, Some(FrequencyBand::Band410To480));
}

#[test]
fn invalid_band_code_reads_as_none() {
    let session = SimSession::new();
    let mut radio = radio(&session);

    radio.write_register(FS_CFG, 0x03).unwrap();
    assert_eq!(radio.read_band().unwrap().0, None);
}
