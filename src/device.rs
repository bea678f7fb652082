//! High-level driver API for the BMP280/BME280
//!
//! The driver owns a device reservation on a shared [`I2cBus`] and walks the
//! chip through identity verification, soft reset, calibration ingestion and
//! configuration before exposing triggered forced-mode measurements.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::{DeviceHandle, I2cBus};
use crate::calibration::Calibration;
use crate::compensation;
use crate::config::{Config, Mode};
use crate::interface::TransactionInterface;
use crate::measurement::{ConversionStatus, Measurement, RawMeasurement};
use crate::registers::Bmp280 as RegisterDevice;
use crate::retry::RetryPolicy;
use crate::{Error, CHIP_ID_BME280, CHIP_ID_BMP280};

// Only import RegisterInterface for the raw burst reads
use device_driver::RegisterInterface;

/// Soft reset command byte; any other value written to RESET is ignored
const SOFT_RESET_COMMAND: u8 = 0xB6;

/// Mandatory settle time after a soft reset, in milliseconds
///
/// This reflects physical chip start-up behavior and is never retried or
/// shortened.
const RESET_SETTLE_MS: u32 = 100;

/// Status poll interval during a forced-mode conversion, in milliseconds
const POLL_INTERVAL_MS: u32 = 1;

/// Status poll ceiling (~100 ms worst case at 1 ms per poll)
const MAX_POLL_ATTEMPTS: u32 = 100;

/// Calibration ingestion retry policy: 3 attempts, 10 ms apart, to ride out
/// transient bus noise at boot
const CALIBRATION_RETRY: RetryPolicy = RetryPolicy::new(3, 10);

/// The hardware variant found at the configured address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// Bosch BMP280 (chip identity 0x58)
    Bmp280,
    /// Bosch BME280 (chip identity 0x60); humidity is not read by this driver
    Bme280,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Bus slot reserved and identity verified, not yet initialized
    Registered,
    /// Fully initialized; measurements are available
    Ready,
    /// Terminal failure; the bus reservation has been released
    Failed,
}

/// Main driver for the BMP280/BME280
pub struct Bmp280Driver<'bus, M: RawMutex, I2C> {
    bus: &'bus I2cBus<M, I2C>,
    handle: DeviceHandle,
    config: Config,
    variant: Variant,
    calibration: Option<Calibration>,
    state: State,
}

impl<'bus, M: RawMutex, I2C: I2c> Bmp280Driver<'bus, M, I2C> {
    /// Reserve a bus slot and verify the chip identity
    ///
    /// Reads the `ID` register once and accepts either supported variant.
    /// Call [`Bmp280Driver::init`] afterwards; measurements are rejected with
    /// [`Error::NotReady`] until initialization completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is already reserved, the bus faults,
    /// or the identity register matches neither supported chip. The bus
    /// reservation is released again on every failure path.
    pub fn new(bus: &'bus I2cBus<M, I2C>, config: Config) -> Result<Self, Error<I2C::Error>> {
        let handle = bus.register_device(config.address.value(), config.clock_hz)?;

        let id = bus.transaction(|txn| {
            let mut device = RegisterDevice::new(TransactionInterface::new(txn, &handle));
            device.id().read().map(|reg| reg.chip_id())
        });

        let variant = match id {
            Ok(CHIP_ID_BMP280) => Variant::Bmp280,
            Ok(CHIP_ID_BME280) => Variant::Bme280,
            Ok(other) => {
                bus.unregister_device(&handle);
                return Err(Error::NotFound(other));
            }
            Err(error) => {
                bus.unregister_device(&handle);
                return Err(Error::Bus(error));
            }
        };
        log::info!("found {:?} at address 0x{:02x}", variant, handle.address());

        Ok(Self {
            bus,
            handle,
            config,
            variant,
            calibration: None,
            state: State::Registered,
        })
    }

    /// Initialize the device: soft reset, calibration ingestion and
    /// configuration
    ///
    /// The reset settle time (~100 ms) is mandatory and blocks the calling
    /// thread. On any failure the driver releases its bus reservation and
    /// enters a terminal failed state; all later calls return
    /// [`Error::NotReady`].
    ///
    /// # Errors
    ///
    /// [`Error::Unresponsive`] if the chip does not answer after reset,
    /// [`Error::CalibrationReadFailed`] after exhausting the calibration
    /// retries, [`Error::InvalidCalibration`] for zero or degenerate
    /// coefficients, and [`Error::Bus`] for faults in the configuration
    /// writes.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<I2C::Error>> {
        if self.state == State::Failed {
            return Err(Error::NotReady);
        }
        match self.run_init(delay) {
            Ok(()) => {
                self.state = State::Ready;
                log::info!(
                    "initialization complete (addr=0x{:02x}, clock={}Hz, osrs_t={:?}, osrs_p={:?}, filter={:?})",
                    self.handle.address(),
                    self.handle.clock_hz(),
                    self.config.temperature_oversampling,
                    self.config.pressure_oversampling,
                    self.config.filter
                );
                Ok(())
            }
            Err(error) => {
                self.bus.unregister_device(&self.handle);
                self.state = State::Failed;
                Err(error)
            }
        }
    }

    fn run_init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<I2C::Error>> {
        let handle = &self.handle;

        self.bus.transaction(|txn| {
            let mut device = RegisterDevice::new(TransactionInterface::new(txn, handle));
            device.reset().write(|w| w.set_reset(SOFT_RESET_COMMAND))
        })?;

        // Wait for the power-on-reset procedure to finish
        delay.delay_ms(RESET_SETTLE_MS);

        // One status read proves the chip came back; the value itself is
        // unconstrained here.
        self.bus
            .transaction(|txn| {
                let mut device = RegisterDevice::new(TransactionInterface::new(txn, handle));
                device.status().read()
            })
            .map_err(|_| {
                log::error!("sensor not responding after reset");
                Error::Unresponsive
            })?;

        let calibration = self.load_calibration(delay)?;
        if !calibration.is_valid() {
            log::error!(
                "invalid calibration data - dig_t1: {}, dig_p1: {}",
                calibration.dig_t1,
                calibration.dig_p1
            );
            return Err(Error::InvalidCalibration);
        }
        self.calibration = Some(calibration);

        let config = self.config;
        self.bus.transaction(|txn| {
            let mut device = RegisterDevice::new(TransactionInterface::new(txn, handle));
            // Stay in sleep mode; forced mode is requested per measurement
            device.ctrl_meas().write(|w| {
                w.set_osrs_t(config.temperature_oversampling.bits());
                w.set_osrs_p(config.pressure_oversampling.bits());
                w.set_mode(Mode::Sleep.bits());
            })?;
            device.config().write(|w| {
                w.set_filter(config.filter.bits());
            })
        })?;

        Ok(())
    }

    /// Read the 24-byte calibration block with bounded retries
    fn load_calibration(
        &self,
        delay: &mut impl DelayNs,
    ) -> Result<Calibration, Error<I2C::Error>> {
        const CALIB_START: u8 = 0x88;

        let handle = &self.handle;
        let mut raw = [0u8; 24];
        CALIBRATION_RETRY
            .run(
                delay,
                || {
                    self.bus.transaction(|txn| {
                        let mut interface = TransactionInterface::new(txn, handle);
                        interface.read_register(CALIB_START, 192, &mut raw)
                    })
                },
                |_| true,
            )
            .map_err(|_| {
                log::error!(
                    "failed to read calibration after {} attempts",
                    CALIBRATION_RETRY.max_attempts
                );
                Error::CalibrationReadFailed
            })?;

        Ok(Calibration::from_bytes(&raw))
    }

    /// Trigger one forced-mode conversion and return the raw 20-bit pair
    ///
    /// The whole trigger/poll/read sequence runs under a single bus lock
    /// acquisition so another device's traffic cannot interleave with the
    /// in-flight conversion. Polls the `measuring` bit every millisecond up
    /// to 100 times; if the ceiling is exhausted the data registers are read
    /// anyway and the result is flagged [`ConversionStatus::PollTimeout`].
    /// The status bit is deliberately not re-checked between the last poll
    /// and the burst read; the sentinel check below catches data that never
    /// arrived.
    ///
    /// # Errors
    ///
    /// [`Error::NotReady`] before initialization, [`Error::Bus`] on any
    /// transport fault (never retried here), [`Error::InvalidRawReading`] if
    /// either channel carries a sentinel pattern.
    pub fn read_raw(&mut self, delay: &mut impl DelayNs) -> Result<RawMeasurement, Error<I2C::Error>> {
        const PRESS_MSB: u8 = 0xF7;

        if self.state != State::Ready {
            return Err(Error::NotReady);
        }
        let handle = &self.handle;
        let config = self.config;

        let result: Result<(ConversionStatus, [u8; 6]), I2C::Error> =
            self.bus.transaction(|txn| {
                let mut device = RegisterDevice::new(TransactionInterface::new(txn, handle));

                device.ctrl_meas().write(|w| {
                    w.set_osrs_t(config.temperature_oversampling.bits());
                    w.set_osrs_p(config.pressure_oversampling.bits());
                    w.set_mode(Mode::Forced.bits());
                })?;

                let mut status = ConversionStatus::PollTimeout;
                for _ in 0..MAX_POLL_ATTEMPTS {
                    delay.delay_ms(POLL_INTERVAL_MS);
                    if !device.status().read()?.measuring() {
                        status = ConversionStatus::Complete;
                        break;
                    }
                }
                if status == ConversionStatus::PollTimeout {
                    // Continue anyway - the data might still be valid
                    log::warn!(
                        "measurement timeout after {} polls",
                        MAX_POLL_ATTEMPTS
                    );
                }

                let mut data = [0u8; 6];
                device.interface.read_register(PRESS_MSB, 48, &mut data)?;
                Ok((status, data))
            });
        let (status, data) = result?;

        let raw = RawMeasurement::from_bytes(&data, status);
        if !raw.is_valid() {
            log::warn!(
                "invalid raw values - temp: 0x{:05x}, press: 0x{:05x}",
                raw.temperature,
                raw.pressure
            );
            return Err(Error::InvalidRawReading);
        }
        Ok(raw)
    }

    /// Trigger one measurement and return compensated physical values
    ///
    /// Convenience wrapper around [`Bmp280Driver::read_raw`] and
    /// [`compensation::compensate`].
    ///
    /// # Errors
    ///
    /// Propagates everything [`Bmp280Driver::read_raw`] can return.
    pub fn read(&mut self, delay: &mut impl DelayNs) -> Result<Measurement, Error<I2C::Error>> {
        let raw = self.read_raw(delay)?;
        let calibration = self.calibration.as_ref().ok_or(Error::NotReady)?;
        let (temperature_celsius, pressure_pascals) =
            compensation::compensate(raw.temperature as i32, raw.pressure as i32, calibration);
        Ok(Measurement {
            temperature_celsius,
            pressure_pascals,
            status: raw.status,
        })
    }

    /// The hardware variant found during construction
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The calibration coefficients, once initialization has loaded them
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Whether initialization completed and measurements are available
    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }
}

impl<M: RawMutex, I2C> Drop for Bmp280Driver<'_, M, I2C> {
    /// Release the bus-address reservation
    ///
    /// A failed initialization already released it, and the address may have
    /// been re-registered by a replacement driver since; releasing again here
    /// would steal that reservation.
    fn drop(&mut self) {
        if self.state != State::Failed {
            self.bus.unregister_device(&self.handle);
        }
    }
}
