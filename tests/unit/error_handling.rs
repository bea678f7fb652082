//! Failure-path tests: identity mismatch, calibration retries, sentinel
//! readings and the terminal failed state

use bmp280::{Bmp280Driver, Config, Error, RetryPolicy};

use crate::common::mock_bus::{
    MockError, Operation, REG_CALIB_START, REG_ID, REG_STATUS,
};
use crate::common::test_utils::{new_mock_bus, MockDelay};

#[test]
fn test_bus_error_conversion() {
    let error: Error<MockError> = MockError.into();
    assert_eq!(error, Error::Bus(MockError));
}

#[test]
fn test_unknown_chip_identity_rejected() {
    let (bus, mock) = new_mock_bus();
    mock.add_chip(0x76, 0x55);

    let result = Bmp280Driver::new(&bus, Config::default());
    assert_eq!(result.err().unwrap(), Error::NotFound(0x55));

    // The reservation was released on the failure path
    bus.register_device(0x76, 100_000).unwrap();
}

#[test]
fn test_bus_fault_during_identity_read() {
    let (bus, mock) = new_mock_bus();
    mock.fail_next_read_of(REG_ID);

    let result = Bmp280Driver::new(&bus, Config::default());
    assert_eq!(result.err().unwrap(), Error::Bus(MockError));

    bus.register_device(0x76, 100_000).unwrap();
}

#[test]
fn test_absent_chip_reports_bus_error() {
    let (bus, _mock) = new_mock_bus();

    let result = Bmp280Driver::new(
        &bus,
        Config {
            address: bmp280::Address::SdoHigh,
            ..Config::default()
        },
    );
    assert_eq!(result.err().unwrap(), Error::Bus(MockError));
}

#[test]
fn test_unresponsive_after_reset() {
    let (bus, mock) = new_mock_bus();
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();

    mock.fail_next_read_of(REG_STATUS);
    assert_eq!(driver.init(&mut MockDelay).unwrap_err(), Error::Unresponsive);
    assert!(!driver.is_ready());
}

#[test]
fn test_calibration_retry_exhaustion() {
    let (bus, mock) = new_mock_bus();
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();

    mock.fail_calibration_reads(3);
    assert_eq!(
        driver.init(&mut MockDelay).unwrap_err(),
        Error::CalibrationReadFailed
    );

    // All three attempts went out on the wire
    let calibration_reads = mock
        .operations()
        .iter()
        .filter(|op| matches!(op, Operation::Read { register: REG_CALIB_START, .. }))
        .count();
    assert_eq!(calibration_reads, 3);

    // The failure is terminal and the reservation is released
    assert!(!driver.is_ready());
    assert_eq!(driver.read_raw(&mut MockDelay).unwrap_err(), Error::NotReady);
    assert_eq!(driver.init(&mut MockDelay).unwrap_err(), Error::NotReady);
    bus.register_device(0x76, 100_000).unwrap();
}

#[test]
fn test_calibration_retry_recovers_from_transient_faults() {
    let (bus, mock) = new_mock_bus();
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();

    mock.fail_calibration_reads(2);
    driver.init(&mut MockDelay).unwrap();
    assert!(driver.is_ready());

    let calibration_reads = mock
        .operations()
        .iter()
        .filter(|op| matches!(op, Operation::Read { register: REG_CALIB_START, .. }))
        .count();
    assert_eq!(calibration_reads, 3);
}

#[test]
fn test_zero_calibration_block_rejected() {
    let (bus, mock) = new_mock_bus();
    mock.set_calibration([0u8; 24]);
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();

    assert_eq!(
        driver.init(&mut MockDelay).unwrap_err(),
        Error::InvalidCalibration
    );
    assert!(driver.calibration().is_none());
}

#[test]
fn test_all_ones_calibration_block_rejected() {
    let (bus, mock) = new_mock_bus();
    mock.set_calibration([0xFF; 24]);
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();

    assert_eq!(
        driver.init(&mut MockDelay).unwrap_err(),
        Error::InvalidCalibration
    );
}

#[test]
fn test_measurement_before_init_rejected() {
    let (bus, _mock) = new_mock_bus();
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();

    assert_eq!(driver.read_raw(&mut MockDelay).unwrap_err(), Error::NotReady);
    assert_eq!(driver.read(&mut MockDelay).unwrap_err(), Error::NotReady);
}

#[test]
fn test_sentinel_raw_reading_rejected_but_recoverable() {
    let (bus, mock) = new_mock_bus();
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();
    driver.init(&mut MockDelay).unwrap();

    // Skipped temperature channel
    mock.set_raw_values(0x80000, 415_148);
    assert_eq!(
        driver.read_raw(&mut MockDelay).unwrap_err(),
        Error::InvalidRawReading
    );

    // Empty pressure channel
    mock.set_raw_values(519_888, 0x00000);
    assert_eq!(
        driver.read_raw(&mut MockDelay).unwrap_err(),
        Error::InvalidRawReading
    );

    // Not a terminal state; the next conversion can succeed
    assert!(driver.is_ready());
    mock.set_raw_values(519_888, 415_148);
    driver.read_raw(&mut MockDelay).unwrap();
}

#[test]
fn test_bus_fault_during_measurement_is_not_retried() {
    let (bus, mock) = new_mock_bus();
    let mut driver = Bmp280Driver::new(&bus, Config::default()).unwrap();
    driver.init(&mut MockDelay).unwrap();
    mock.clear_operations();

    mock.fail_next_write();
    assert_eq!(
        driver.read_raw(&mut MockDelay).unwrap_err(),
        Error::Bus(MockError)
    );
    // Exactly one trigger attempt, nothing after the fault
    assert_eq!(mock.operations().len(), 1);

    // Measurement errors are not terminal
    assert!(driver.is_ready());
    driver.read_raw(&mut MockDelay).unwrap();
}

#[test]
fn test_drop_of_failed_driver_keeps_replacement_reservation() {
    let (bus, mock) = new_mock_bus();

    let mut failed = Bmp280Driver::new(&bus, Config::default()).unwrap();
    mock.fail_calibration_reads(3);
    assert_eq!(
        failed.init(&mut MockDelay).unwrap_err(),
        Error::CalibrationReadFailed
    );

    // The failed init released the slot; a replacement takes it over
    let _replacement = Bmp280Driver::new(&bus, Config::default()).unwrap();
    drop(failed);

    // The replacement still holds the address after the failed driver is gone
    assert_eq!(
        Bmp280Driver::new(&bus, Config::default()).err().unwrap(),
        Error::AddressInUse(0x76)
    );
}

#[test]
fn test_second_driver_at_same_address_rejected() {
    let (bus, _mock) = new_mock_bus();
    let _first = Bmp280Driver::new(&bus, Config::default()).unwrap();

    assert_eq!(
        Bmp280Driver::new(&bus, Config::default()).err().unwrap(),
        Error::AddressInUse(0x76)
    );
}

#[test]
fn test_retry_policy_stops_on_success() {
    let policy = RetryPolicy::new(5, 0);
    let mut attempts = 0;
    let result: Result<u32, ()> = policy.run(
        &mut MockDelay,
        || {
            attempts += 1;
            if attempts < 3 {
                Err(())
            } else {
                Ok(attempts)
            }
        },
        |_| true,
    );
    assert_eq!(result, Ok(3));
    assert_eq!(attempts, 3);
}

#[test]
fn test_retry_policy_returns_last_error() {
    let policy = RetryPolicy::new(3, 0);
    let mut attempts = 0;
    let result: Result<(), u32> = policy.run(
        &mut MockDelay,
        || {
            attempts += 1;
            Err(attempts)
        },
        |_| true,
    );
    assert_eq!(result, Err(3));
}

#[test]
fn test_retry_policy_respects_retryable_predicate() {
    let policy = RetryPolicy::new(5, 0);
    let mut attempts = 0;
    let result: Result<(), u32> = policy.run(
        &mut MockDelay,
        || {
            attempts += 1;
            Err(attempts)
        },
        |&error| error < 2,
    );
    assert_eq!(result, Err(2));
    assert_eq!(attempts, 2);
}
