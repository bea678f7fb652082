//! Fixed-point compensation of raw ADC counts
//!
//! Bit-exact port of the integer algorithm from the datasheet (section
//! 3.11.3). All intermediates are evaluated in 64-bit signed arithmetic with
//! the exact shift/multiply/add sequence the manufacturer specifies; floating
//! point enters only at the final division. Substituting floats for the
//! integer stages changes the output enough to fail the published reference
//! vectors.
//!
//! These are pure functions: no state, deterministic for fixed inputs.

use crate::calibration::Calibration;

/// Compute the fine-temperature intermediate (`t_fine`)
///
/// `t_fine` is shared between the temperature and pressure formulas and is
/// the exact integer value the datasheet algorithm produces, so conformance
/// against reference vectors can check it directly.
pub fn fine_temperature(raw_temp: i32, calibration: &Calibration) -> i32 {
    let raw = raw_temp as i64;
    let dig_t1 = calibration.dig_t1 as i64;
    let dig_t2 = calibration.dig_t2 as i64;
    let dig_t3 = calibration.dig_t3 as i64;

    let var1 = (((raw >> 3) - (dig_t1 << 1)) * dig_t2) >> 11;
    let var2 = ((((raw >> 4) - dig_t1) * ((raw >> 4) - dig_t1)) >> 12) * dig_t3 >> 14;
    (var1 + var2) as i32
}

/// Compensate a raw (temperature, pressure) pair into physical units
///
/// Returns `(temperature in degrees Celsius, pressure in Pa)`. If the first
/// intermediate denominator of the pressure polynomial evaluates to zero the
/// pressure is reported as `0.0` instead of dividing by zero; this mirrors
/// undefined sensor behavior rather than crashing.
pub fn compensate(raw_temp: i32, raw_press: i32, calibration: &Calibration) -> (f64, f64) {
    let t_fine = fine_temperature(raw_temp, calibration);
    let temperature = ((t_fine as i64 * 5 + 128) as f64) / 25600.0;
    let pressure = compensate_pressure(raw_press, t_fine, calibration);
    (temperature, pressure)
}

/// Compensate a raw pressure reading given a previously computed `t_fine`
///
/// Seven-term 64-bit fixed-point polynomial over the nine pressure
/// coefficients, returning Pa.
pub fn compensate_pressure(raw_press: i32, t_fine: i32, calibration: &Calibration) -> f64 {
    let dig_p1 = calibration.dig_p1 as i64;
    let dig_p2 = calibration.dig_p2 as i64;
    let dig_p3 = calibration.dig_p3 as i64;
    let dig_p4 = calibration.dig_p4 as i64;
    let dig_p5 = calibration.dig_p5 as i64;
    let dig_p6 = calibration.dig_p6 as i64;
    let dig_p7 = calibration.dig_p7 as i64;
    let dig_p8 = calibration.dig_p8 as i64;
    let dig_p9 = calibration.dig_p9 as i64;

    let mut var1 = t_fine as i64 - 128000;
    let mut var2 = var1 * var1 * dig_p6;
    var2 += (var1 * dig_p5) << 17;
    var2 += dig_p4 << 35;
    var1 = ((var1 * var1 * dig_p3) >> 8) + ((var1 * dig_p2) << 12);
    var1 = (((1i64 << 47) + var1) * dig_p1) >> 33;

    if var1 == 0 {
        // Avoid division by zero
        return 0.0;
    }

    let mut p = 1048576 - raw_press as i64;
    p = (((p << 31) - var2) * 3125) / var1;
    var1 = (dig_p9 * (p >> 13) * (p >> 13)) >> 25;
    var2 = (dig_p8 * p) >> 19;
    p = ((p + var1 + var2) >> 8) + (dig_p7 << 4);
    p as f64 / 256.0
}
