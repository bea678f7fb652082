//! Raw and compensated measurement types
//!
//! A triggered conversion produces a 6-byte burst starting at `PRESS_MSB`:
//! three pressure bytes then three temperature bytes, each triplet packing a
//! 20-bit value MSB-first with the bottom nibble of the last byte unused.

/// Reserved raw pattern meaning "conversion never ran" (skipped channel)
pub const RAW_SENTINEL_SKIPPED: u32 = 0x80000;

/// Reserved raw pattern meaning "no data" (chip still converting or never
/// measured)
pub const RAW_SENTINEL_EMPTY: u32 = 0x00000;

/// Outcome of the status-poll phase of a triggered measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionStatus {
    /// The `measuring` bit cleared within the poll ceiling
    Complete,
    /// The poll ceiling was exhausted and the data was read anyway
    ///
    /// Best-effort policy: the conversion may have finished between the last
    /// poll and the burst read, so the data is returned rather than
    /// discarded, flagged so callers can distinguish "possibly stale" from
    /// "absent".
    PollTimeout,
}

/// One raw measurement pair as decoded from the 6-byte burst
///
/// Ephemeral: produced per measurement cycle and consumed immediately by
/// compensation, never retained by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawMeasurement {
    /// 20-bit raw temperature ADC count
    pub temperature: u32,
    /// 20-bit raw pressure ADC count
    pub pressure: u32,
    /// Whether the conversion was confirmed complete before the read
    pub status: ConversionStatus,
}

impl RawMeasurement {
    /// Decode a 6-byte measurement burst (pressure bytes first)
    ///
    /// Always produces values in `0..=0xFFFFF`; validity is a separate
    /// question answered by [`RawMeasurement::is_valid`].
    pub fn from_bytes(data: &[u8; 6], status: ConversionStatus) -> Self {
        Self {
            pressure: decode_20bit(data[0], data[1], data[2]),
            temperature: decode_20bit(data[3], data[4], data[5]),
            status,
        }
    }

    /// Whether neither channel carries a reserved sentinel pattern
    pub fn is_valid(&self) -> bool {
        !is_sentinel(self.temperature) && !is_sentinel(self.pressure)
    }
}

/// Assemble one 20-bit value from an MSB/LSB/XLSB byte triplet
///
/// `value = (msb << 12) | (lsb << 4) | (xlsb >> 4)`; the bottom nibble of
/// `xlsb` is discarded.
pub fn decode_20bit(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    ((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4)
}

/// Whether a raw 20-bit value is one of the reserved sentinel patterns
pub fn is_sentinel(raw: u32) -> bool {
    raw == RAW_SENTINEL_EMPTY || raw == RAW_SENTINEL_SKIPPED
}

/// A compensated measurement in physical units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Temperature in degrees Celsius
    pub temperature_celsius: f64,
    /// Pressure in Pascal
    pub pressure_pascals: f64,
    /// Whether the conversion was confirmed complete before the read
    pub status: ConversionStatus,
}
