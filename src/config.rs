//! Build-time configuration surface for the driver
//!
//! Bus address, bus clock, oversampling factors and the IIR filter
//! coefficient are fixed at construction and never mutated at runtime. The
//! encodings match the `ctrl_meas` (0xF4) and `config` (0xF5) register
//! layouts from the datasheet.

use crate::{I2C_ADDRESS_SDO_HIGH, I2C_ADDRESS_SDO_LOW};

/// 7-bit bus address, selected in hardware by the SDO strap pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// SDO tied to ground: address 0x76 (default)
    SdoLow,
    /// SDO tied to VDDIO: address 0x77
    SdoHigh,
}

impl Address {
    /// The 7-bit wire address for this strap configuration
    pub const fn value(self) -> u8 {
        match self {
            Address::SdoLow => I2C_ADDRESS_SDO_LOW,
            Address::SdoHigh => I2C_ADDRESS_SDO_HIGH,
        }
    }
}

/// Oversampling setting for one measurement channel
///
/// Encodes the 3-bit `osrs_t`/`osrs_p` fields of `ctrl_meas`. Higher
/// oversampling improves resolution and RMS noise at the cost of conversion
/// time (datasheet Table 15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    /// Channel disabled; output reads as the sentinel 0x80000
    Skip = 0b000,
    /// 1x (16-bit result)
    X1 = 0b001,
    /// 2x (17-bit result)
    X2 = 0b010,
    /// 4x (18-bit result)
    X4 = 0b011,
    /// 8x (19-bit result)
    X8 = 0b100,
    /// 16x (20-bit result)
    X16 = 0b101,
}

impl Oversampling {
    /// The 3-bit register encoding
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// IIR filter time constant (`filter` field of the config register)
///
/// Smooths short-term pressure disturbances such as wind or slamming doors.
/// Has no effect on single forced-mode conversions unless several are taken
/// in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    /// Filter off, full bandwidth
    Off = 0b000,
    /// Coefficient 2
    X2 = 0b001,
    /// Coefficient 4
    X4 = 0b010,
    /// Coefficient 8
    X8 = 0b011,
    /// Coefficient 16
    X16 = 0b100,
}

impl Filter {
    /// The 3-bit register encoding
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Power mode (`mode` field of `ctrl_meas`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// No measurements, lowest power, registers readable
    Sleep = 0b00,
    /// One conversion cycle, then automatic return to sleep
    Forced = 0b01,
    /// Continuous measure/standby cycling
    Normal = 0b11,
}

impl Mode {
    /// The 2-bit register encoding
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Fixed driver configuration, supplied once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Bus address strap
    pub address: Address,
    /// Bus clock for this device's transactions, in Hz
    pub clock_hz: u32,
    /// Temperature channel oversampling
    pub temperature_oversampling: Oversampling,
    /// Pressure channel oversampling
    pub pressure_oversampling: Oversampling,
    /// IIR filter coefficient
    pub filter: Filter,
}

impl Default for Config {
    /// The datasheet "weather monitoring" profile: 1x/1x oversampling and
    /// filter off, suited to low-rate forced-mode sampling.
    fn default() -> Self {
        Self {
            address: Address::SdoLow,
            clock_hz: 100_000,
            temperature_oversampling: Oversampling::X1,
            pressure_oversampling: Oversampling::X1,
            filter: Filter::Off,
        }
    }
}
