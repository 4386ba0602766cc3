//! Small numeric helpers shared by the analyzers.
//!
//! - [`linear_to_db`] / [`power_ratio_to_db`] - level conversions with a floor
//! - [`parabolic_peak`] - three-point vertex refinement
//! - [`rms`] - frame energy gate

use libm::{log10f, logf, sqrtf};

/// Floor applied to linear amplitudes before taking a logarithm.
pub const AMPLITUDE_FLOOR: f32 = 1e-10;

/// Level reported for amplitudes at or below [`AMPLITUDE_FLOOR`].
pub const DB_FLOOR: f32 = -200.0;

/// Convert a linear amplitude to decibels.
///
/// Values at or below [`AMPLITUDE_FLOOR`] map to -200 dB instead of -inf.
///
/// ```rust
/// use loqa_voice_dsp::math::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// assert_eq!(linear_to_db(0.0), -200.0);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    if !(linear > AMPLITUDE_FLOOR) {
        return DB_FLOOR;
    }
    logf(linear) * FACTOR
}

/// Convert a power ratio to decibels (`10 * log10(ratio)`).
#[inline]
pub fn power_ratio_to_db(ratio: f32) -> f32 {
    if !(ratio > AMPLITUDE_FLOOR) {
        return DB_FLOOR / 2.0;
    }
    10.0 * log10f(ratio)
}

/// Root-mean-square level of a frame. Empty frames are silent.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f32 = samples.iter().map(|&x| x * x).sum();
    sqrtf(energy / samples.len() as f32)
}

/// Fit a parabola through three equally spaced points and return the vertex.
///
/// `left`, `center`, `right` are the values at offsets -1, 0, +1. Returns
/// `(offset, value)` where `offset` lies in `[-0.5, 0.5]` when `center` is an
/// extremum. A flat triple returns `(0.0, center)`.
#[inline]
pub fn parabolic_peak(left: f32, center: f32, right: f32) -> (f32, f32) {
    let denom = left - 2.0 * center + right;
    if denom.abs() < 1e-12 {
        return (0.0, center);
    }
    let offset = (0.5 * (left - right) / denom).clamp(-1.0, 1.0);
    let value = center - 0.25 * (left - right) * offset;
    (offset, value)
}
