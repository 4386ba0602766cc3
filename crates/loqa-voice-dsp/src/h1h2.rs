//! Amplitude difference between the first two harmonics (H1-H2).
//!
//! H1-H2 tracks the open quotient of the glottis: breathy phonation has a
//! dominant fundamental (large positive H1-H2), pressed phonation a strong
//! second harmonic. Each harmonic is located as the spectral peak nearest
//! `h · f0` and its level read after parabolic interpolation, in the same way
//! harmonic levels are measured for distortion analysis.

use crate::config::H1H2Config;
use crate::error::{AnalysisError, AnalysisResult};
use crate::fft::{Fft, MAX_FFT_SIZE, WindowType};
use crate::frame::AudioFrame;
use crate::math::{linear_to_db, parabolic_peak};

/// Levels of the first two harmonics of a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct H1H2Result {
    /// `h1_amplitude_db − h2_amplitude_db` in dB.
    pub h1h2: f32,
    /// Level of the fundamental in dB (unit sinusoid ≈ 0 dB).
    pub h1_amplitude_db: f32,
    /// Level of the second harmonic in dB.
    pub h2_amplitude_db: f32,
    /// Fundamental frequency used for the measurement, in Hz.
    pub f0: f32,
}

impl H1H2Result {
    /// Result reported when the measurement is impossible.
    pub const NONE: Self = Self {
        h1h2: 0.0,
        h1_amplitude_db: 0.0,
        h2_amplitude_db: 0.0,
        f0: 0.0,
    };
}

/// H1-H2 analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct H1H2Analyzer {
    config: H1H2Config,
}

impl H1H2Analyzer {
    /// Create an analyzer with the given settings.
    pub fn new(config: H1H2Config) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &H1H2Config {
        &self.config
    }

    /// Transform length for a frame of `len` samples.
    fn fft_size(&self, len: usize) -> usize {
        len.max(self.config.min_fft_size)
            .min(MAX_FFT_SIZE)
            .next_power_of_two()
    }

    /// Measure H1-H2 given the frame's fundamental frequency.
    pub fn try_analyze(&self, frame: &AudioFrame<'_>, f0: f32) -> AnalysisResult<H1H2Result> {
        let samples = frame.require_samples()?;
        if !(f0.is_finite() && f0 > 0.0) {
            return Err(AnalysisError::invalid_input(format!(
                "fundamental frequency must be positive, got {f0}"
            )));
        }
        if 2.0 * f0 >= frame.nyquist() {
            return Err(AnalysisError::invalid_input(format!(
                "second harmonic of {f0} Hz is at or above Nyquist"
            )));
        }

        let fft = Fft::new(self.fft_size(samples.len()));
        let analyzed = samples.len().min(fft.size());
        // A one-sample Hann window is all zeros; the spectrum is then silent.
        let gain = (WindowType::Hann.coherent_sum(analyzed) / 2.0).max(f32::MIN_POSITIVE);
        let magnitudes: Vec<f32> = fft
            .windowed_magnitudes(samples, WindowType::Hann)
            .into_iter()
            .map(|m| m / gain)
            .collect();

        let bin_hz = frame.sample_rate() / fft.size() as f32;
        let half_width = (self.config.search_fraction * f0 / bin_hz).max(1.0);
        let h1 = harmonic_amplitude(&magnitudes, f0 / bin_hz, half_width);
        let h2 = harmonic_amplitude(&magnitudes, 2.0 * f0 / bin_hz, half_width);
        let (h1_db, h2_db) = (linear_to_db(h1), linear_to_db(h2));

        #[cfg(feature = "tracing")]
        tracing::trace!(f0, h1_db, h2_db, fft_size = fft.size(), "harmonic levels");

        Ok(H1H2Result {
            h1h2: h1_db - h2_db,
            h1_amplitude_db: h1_db,
            h2_amplitude_db: h2_db,
            f0,
        })
    }

    /// Measure H1-H2; invalid input yields [`H1H2Result::NONE`].
    pub fn analyze(&self, frame: &AudioFrame<'_>, f0: f32) -> H1H2Result {
        self.try_analyze(frame, f0).unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_err, "h1-h2 measurement skipped");
            H1H2Result::NONE
        })
    }
}

/// Interpolated amplitude of the largest bin within `half_width` bins of `center`.
fn harmonic_amplitude(magnitudes: &[f32], center: f32, half_width: f32) -> f32 {
    if magnitudes.len() < 3 {
        return 0.0;
    }
    let lo = ((center - half_width).floor() as usize).max(1);
    let hi = ((center + half_width).ceil() as usize).min(magnitudes.len() - 2);
    if lo > hi {
        return 0.0;
    }

    let peak = (lo..=hi).fold(lo, |best, k| {
        if magnitudes[k] > magnitudes[best] { k } else { best }
    });
    let (_, amplitude) =
        parabolic_peak(magnitudes[peak - 1], magnitudes[peak], magnitudes[peak + 1]);
    amplitude.max(magnitudes[peak])
}

/// Measure H1-H2 with default settings.
pub fn calculate_h1h2(frame: &AudioFrame<'_>, f0: f32) -> H1H2Result {
    H1H2Analyzer::default().analyze(frame, f0)
}
