//! YIN fundamental frequency estimation.
//!
//! Follows *YIN, a fundamental frequency estimator for speech and music*
//! (de Cheveigné & Kawahara, 2002), steps 2–5:
//!
//! 1. Difference function `d(τ) = Σ_{i<W} (x[i] − x[i+τ])²` over a fixed
//!    integration window `W = N − τ_max`, evaluated through the shared
//!    [`lag_terms`] kernel.
//! 2. Cumulative mean normalized difference `d'(0) = 1`,
//!    `d'(τ) = d(τ) · τ / Σ_{j=1..τ} d(j)`.
//! 3. Absolute threshold: the first `τ ≥ τ_min` with `d'(τ)` below the
//!    threshold, followed downhill to its local minimum.
//! 4. Parabolic interpolation of `d'` around that minimum.
//!
//! Step 6 (best local estimate over neighbouring frames) needs cross-frame
//! state and is not performed.

use crate::autocorrelation::lag_terms;
use crate::config::PitchConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::frame::AudioFrame;
use crate::math::{parabolic_peak, rms};

/// Pitch estimate of one frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitchResult {
    /// Fundamental frequency in Hz; 0 when unvoiced.
    pub frequency: f32,
    /// 1 − d'(τ) at the accepted lag, in [0, 1].
    pub confidence: f32,
    /// Whether a pitch period was found with sufficient confidence.
    pub is_voiced: bool,
}

impl PitchResult {
    /// Result reported when no pitch period is found.
    pub const UNVOICED: Self = Self {
        frequency: 0.0,
        confidence: 0.0,
        is_voiced: false,
    };
}

/// Compute the cumulative mean normalized difference function for lags
/// `0..=max_lag` over an integration window of `window` samples.
///
/// Lags whose running sum of `d` is zero (a perfectly flat frame) read 1.0.
pub fn cumulative_mean_normalized_difference(
    samples: &[f32],
    max_lag: usize,
    window: usize,
) -> Vec<f32> {
    let mut cmndf = Vec::with_capacity(max_lag + 1);
    cmndf.push(1.0);

    let mut running_sum = 0.0f64;
    for tau in 1..=max_lag {
        let d = lag_terms(samples, tau, window).difference();
        running_sum += d;
        let value = if running_sum > 0.0 {
            d * tau as f64 / running_sum
        } else {
            1.0
        };
        cmndf.push(value as f32);
    }
    cmndf
}

/// YIN pitch detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchDetector {
    config: PitchConfig,
}

impl PitchDetector {
    /// Create a detector with the given settings.
    pub fn new(config: PitchConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &PitchConfig {
        &self.config
    }

    /// Lag search range `(τ_min, τ_max)` for a frame of `len` samples.
    fn lag_range(&self, sample_rate: f32, len: usize) -> AnalysisResult<(usize, usize)> {
        let (lo, hi) = (self.config.min_frequency, self.config.max_frequency);
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && hi > lo) {
            return Err(AnalysisError::invalid_input(format!(
                "invalid pitch range {lo}-{hi} Hz"
            )));
        }
        let min_lag = ((sample_rate / hi).floor() as usize).max(2);
        let max_lag = ((sample_rate / lo).ceil() as usize).min(len / 2);
        if max_lag < min_lag.saturating_add(2) {
            return Err(AnalysisError::invalid_input(format!(
                "frame of {len} samples is too short for a {}-{} Hz search",
                self.config.min_frequency, self.config.max_frequency
            )));
        }
        Ok((min_lag, max_lag))
    }

    /// Estimate the pitch of a frame, reporting why no estimate was possible.
    ///
    /// A frame without any lag under the threshold is a valid unvoiced frame
    /// and returns `Ok(PitchResult::UNVOICED)`.
    pub fn try_detect(&self, frame: &AudioFrame<'_>) -> AnalysisResult<PitchResult> {
        let samples = frame.require_samples()?;
        let sample_rate = frame.sample_rate();
        if !(self.config.min_sample_rate..=self.config.max_sample_rate).contains(&sample_rate) {
            return Err(AnalysisError::invalid_input(format!(
                "sample rate {sample_rate} Hz outside [{}, {}] Hz",
                self.config.min_sample_rate, self.config.max_sample_rate
            )));
        }
        if rms(samples) < self.config.silence_rms {
            return Err(AnalysisError::NumericDegenerate);
        }

        let (min_lag, max_lag) = self.lag_range(sample_rate, samples.len())?;
        let window = samples.len() - max_lag;
        let cmndf = cumulative_mean_normalized_difference(samples, max_lag, window);

        let Some(tau) = self.first_dip(&cmndf, min_lag, max_lag) else {
            return Ok(PitchResult::UNVOICED);
        };

        let refined = if tau < max_lag {
            let (offset, _) = parabolic_peak(cmndf[tau - 1], cmndf[tau], cmndf[tau + 1]);
            tau as f32 + offset
        } else {
            tau as f32
        };

        let confidence = (1.0 - cmndf[tau]).clamp(0.0, 1.0);
        let is_voiced = confidence > self.config.voicing_threshold;

        #[cfg(feature = "tracing")]
        tracing::trace!(tau, refined, confidence, is_voiced, "yin estimate");

        Ok(PitchResult {
            frequency: if is_voiced { sample_rate / refined } else { 0.0 },
            confidence,
            is_voiced,
        })
    }

    /// First lag under the absolute threshold, followed to its local minimum.
    fn first_dip(&self, cmndf: &[f32], min_lag: usize, max_lag: usize) -> Option<usize> {
        let mut tau = (min_lag..=max_lag).find(|&t| cmndf[t] < self.config.threshold)?;
        while tau < max_lag && cmndf[tau + 1] < cmndf[tau] {
            tau += 1;
        }
        Some(tau)
    }

    /// Estimate the pitch of a frame; invalid or silent input is unvoiced.
    pub fn detect(&self, frame: &AudioFrame<'_>) -> PitchResult {
        self.try_detect(frame).unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_err, "pitch detection fell back to unvoiced");
            PitchResult::UNVOICED
        })
    }
}

/// Estimate the pitch of a frame with default settings.
pub fn detect_pitch(frame: &AudioFrame<'_>) -> PitchResult {
    PitchDetector::default().detect(frame)
}
