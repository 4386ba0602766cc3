//! Harmonics-to-noise ratio from the normalized autocorrelation.
//!
//! For a periodic signal buried in noise the peak of the normalized
//! autocorrelation at the pitch period, `r`, splits the frame energy into a
//! harmonic share `r` and a noise share `1 − r` (Boersma, 1993):
//!
//! ```text
//! HNR = 10 · log10(r / (1 − r))   dB
//! ```
//!
//! `r` is clamped to `[1e-6, 1 − 1e-6]`, which bounds the result to about
//! ±60 dB. Frames without a usable peak report −200 dB, Praat's value for
//! unvoiced frames.

use crate::autocorrelation::{highest_local_peak, normalized_autocorrelation};
use crate::config::HnrConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::frame::AudioFrame;
use crate::math::{DB_FLOOR, parabolic_peak, power_ratio_to_db, rms};

/// Smallest correlation accepted before taking the ratio.
const MIN_CORRELATION: f32 = 1e-6;

/// Harmonicity of one frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HnrResult {
    /// Harmonics-to-noise ratio in dB; may be negative.
    pub hnr: f32,
    /// Fundamental frequency of the strongest periodicity in Hz.
    pub f0: f32,
    /// Whether the periodicity is strong enough to call the frame voiced.
    pub is_voiced: bool,
}

impl HnrResult {
    /// Result reported for unvoiced, silent or invalid frames.
    pub const UNVOICED: Self = Self {
        hnr: DB_FLOOR,
        f0: 0.0,
        is_voiced: false,
    };
}

/// HNR from a normalized autocorrelation peak.
pub fn hnr_from_correlation(r: f32) -> f32 {
    let r = r.clamp(MIN_CORRELATION, 1.0 - MIN_CORRELATION);
    power_ratio_to_db(r / (1.0 - r))
}

/// Autocorrelation harmonicity analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HnrAnalyzer {
    config: HnrConfig,
}

impl HnrAnalyzer {
    /// Create an analyzer with the given settings.
    pub fn new(config: HnrConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &HnrConfig {
        &self.config
    }

    /// Measure harmonicity with pitch searched in `[min_freq, max_freq]` Hz.
    ///
    /// A frame whose best correlation peak is not positive is a valid
    /// unvoiced frame and returns `Ok(HnrResult::UNVOICED)`.
    pub fn try_analyze(
        &self,
        frame: &AudioFrame<'_>,
        min_freq: f32,
        max_freq: f32,
    ) -> AnalysisResult<HnrResult> {
        let samples = frame.require_samples()?;
        if !(min_freq.is_finite() && max_freq.is_finite() && min_freq > 0.0 && max_freq > min_freq) {
            return Err(AnalysisError::invalid_input(format!(
                "invalid pitch range {min_freq}-{max_freq} Hz"
            )));
        }
        if rms(samples) < self.config.silence_rms {
            return Err(AnalysisError::NumericDegenerate);
        }

        let sample_rate = frame.sample_rate();
        let min_lag = ((sample_rate / max_freq).floor() as usize).max(1);
        let max_lag = ((sample_rate / min_freq).ceil() as usize).min(samples.len() / 2);
        if min_lag > max_lag {
            return Err(AnalysisError::invalid_input(format!(
                "frame of {} samples is too short for a {min_freq}-{max_freq} Hz search",
                samples.len()
            )));
        }

        // One extra lag so a peak at max_lag still has a right neighbour.
        let correlation = normalized_autocorrelation(samples, max_lag + 1);
        let Some((lag, peak)) = highest_local_peak(&correlation, min_lag, max_lag) else {
            return Ok(HnrResult::UNVOICED);
        };
        if peak <= 0.0 {
            return Ok(HnrResult::UNVOICED);
        }

        let (offset, refined) =
            parabolic_peak(correlation[lag - 1], correlation[lag], correlation[lag + 1]);
        let r = refined.max(peak).min(1.0);
        let period = lag as f32 + offset;

        #[cfg(feature = "tracing")]
        tracing::trace!(lag, period, r, "harmonicity peak");

        Ok(HnrResult {
            hnr: hnr_from_correlation(r),
            f0: sample_rate / period,
            is_voiced: r > self.config.voicing_threshold,
        })
    }

    /// Measure harmonicity; invalid or silent input yields [`HnrResult::UNVOICED`].
    pub fn analyze(&self, frame: &AudioFrame<'_>, min_freq: f32, max_freq: f32) -> HnrResult {
        self.try_analyze(frame, min_freq, max_freq)
            .unwrap_or_else(|_err| {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_err, "harmonicity fell back to unvoiced");
                HnrResult::UNVOICED
            })
    }
}

/// Measure harmonicity with default settings.
pub fn calculate_hnr(frame: &AudioFrame<'_>, min_freq: f32, max_freq: f32) -> HnrResult {
    HnrAnalyzer::default().analyze(frame, min_freq, max_freq)
}
