#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bus;
pub mod calibration;
pub mod compensation;
pub mod config;
pub mod device;
pub mod interface;
pub mod measurement;
pub mod registers;
pub mod retry;

// Re-export main types
pub use bus::{BusTransaction, DeviceHandle, I2cBus};
pub use calibration::Calibration;
pub use config::{Address, Config, Filter, Mode, Oversampling};
pub use device::{Bmp280Driver, Variant};
pub use interface::TransactionInterface;
pub use measurement::{ConversionStatus, Measurement, RawMeasurement};
pub use retry::RetryPolicy;

/// BMP280 I2C address when the SDO pin is tied to ground (default: 0x76)
///
/// This is the most common configuration on breakout boards. Use
/// [`Address::SdoLow`] for this configuration.
pub const I2C_ADDRESS_SDO_LOW: u8 = 0x76;

/// BMP280 I2C address when the SDO pin is tied to VDDIO (alternative: 0x77)
///
/// Use [`Address::SdoHigh`] when the SDO pin is explicitly pulled high.
pub const I2C_ADDRESS_SDO_HIGH: u8 = 0x77;

/// Chip identity reported by a BMP280 in the `ID` register
pub const CHIP_ID_BMP280: u8 = 0x58;

/// Chip identity reported by a BME280 in the `ID` register
///
/// The BME280 is register-compatible for temperature and pressure, so the
/// driver accepts either identity. Humidity readout is not supported.
pub const CHIP_ID_BME280: u8 = 0x60;

/// Driver and bus-arbitration errors
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error on the bus transport
    Bus(E),
    /// Identity register did not match a supported chip (contains the value read)
    NotFound(u8),
    /// No response from the chip after soft reset
    Unresponsive,
    /// Calibration block could not be read after exhausting all retry attempts
    CalibrationReadFailed,
    /// Calibration coefficients are zero or degenerate (all-`0xFF` block)
    InvalidCalibration,
    /// Raw ADC value was a reserved sentinel (`0x00000` or `0x80000`)
    ///
    /// The chip never produces these patterns for a genuine conversion; the
    /// caller may retry the read.
    InvalidRawReading,
    /// Measurement requested before initialization completed, or after a
    /// fatal initialization failure
    NotReady,
    /// Another device is already registered at this bus address
    AddressInUse(u8),
    /// The bus device registry is full
    TooManyDevices,
    /// Invalid configuration parameter (e.g. out-of-range bus clock)
    InvalidConfig,
    /// The bus lock is held by another transaction (bounded-wait access only)
    Busy,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
