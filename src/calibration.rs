//! Factory calibration coefficients
//!
//! Every chip carries twelve factory-trimmed compensation coefficients in a
//! 24-byte block at 0x88..0xA1, stored as little-endian 16-bit pairs. They
//! are read once during initialization and are immutable for the life of the
//! driver instance.

/// Factory-trimmed calibration coefficients for temperature and pressure
/// compensation
///
/// Field order matches the register layout: `dig_t1..dig_t3` then
/// `dig_p1..dig_p9`. `dig_t1` and `dig_p1` are unsigned, the rest signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Temperature coefficient 1 (unsigned, typically ~27000-28000)
    pub dig_t1: u16,
    /// Temperature coefficient 2
    pub dig_t2: i16,
    /// Temperature coefficient 3
    pub dig_t3: i16,
    /// Pressure coefficient 1 (unsigned, typically ~30000-37000)
    pub dig_p1: u16,
    /// Pressure coefficient 2
    pub dig_p2: i16,
    /// Pressure coefficient 3
    pub dig_p3: i16,
    /// Pressure coefficient 4
    pub dig_p4: i16,
    /// Pressure coefficient 5
    pub dig_p5: i16,
    /// Pressure coefficient 6
    pub dig_p6: i16,
    /// Pressure coefficient 7
    pub dig_p7: i16,
    /// Pressure coefficient 8
    pub dig_p8: i16,
    /// Pressure coefficient 9
    pub dig_p9: i16,
}

impl Calibration {
    /// Parse the raw 24-byte calibration block
    ///
    /// Purely positional little-endian decoding; no validation or reordering
    /// is performed here. Parsing is idempotent: the same block always yields
    /// the same coefficient set.
    pub fn from_bytes(raw: &[u8; 24]) -> Self {
        Self {
            dig_t1: u16::from_le_bytes([raw[0], raw[1]]),
            dig_t2: i16::from_le_bytes([raw[2], raw[3]]),
            dig_t3: i16::from_le_bytes([raw[4], raw[5]]),
            dig_p1: u16::from_le_bytes([raw[6], raw[7]]),
            dig_p2: i16::from_le_bytes([raw[8], raw[9]]),
            dig_p3: i16::from_le_bytes([raw[10], raw[11]]),
            dig_p4: i16::from_le_bytes([raw[12], raw[13]]),
            dig_p5: i16::from_le_bytes([raw[14], raw[15]]),
            dig_p6: i16::from_le_bytes([raw[16], raw[17]]),
            dig_p7: i16::from_le_bytes([raw[18], raw[19]]),
            dig_p8: i16::from_le_bytes([raw[20], raw[21]]),
            dig_p9: i16::from_le_bytes([raw[22], raw[23]]),
        }
    }

    /// Whether the coefficient set is usable
    ///
    /// A chip that was never trimmed, or a bus that returned garbage, shows
    /// up as `dig_t1 == 0`, `dig_p1 == 0` (all-zero block) or an all-`0xFF`
    /// block. Such a set must never be fed into compensation.
    pub fn is_valid(&self) -> bool {
        self.dig_t1 != 0 && self.dig_p1 != 0 && !self.is_all_ones()
    }

    fn is_all_ones(&self) -> bool {
        self.dig_t1 == 0xFFFF
            && self.dig_p1 == 0xFFFF
            && [
                self.dig_t2, self.dig_t3, self.dig_p2, self.dig_p3, self.dig_p4, self.dig_p5,
                self.dig_p6, self.dig_p7, self.dig_p8, self.dig_p9,
            ]
            .iter()
            .all(|&c| c == -1)
    }
}
