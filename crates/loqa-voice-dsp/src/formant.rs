//! Formant estimation from LPC pole angles.
//!
//! The frame is pre-emphasized, Hamming-windowed and modelled as an all-pole
//! filter. Each complex pole `z` in the upper half plane maps to a resonance:
//!
//! ```text
//! F = arg(z) · sr / 2π
//! B = −ln|z| · sr / π
//! ```
//!
//! Poles too close to DC or Nyquist, or too wide to be a vocal tract
//! resonance, are discarded. The lowest three survivors are F1, F2 and F3.

use std::f64::consts::PI;

use crate::autocorrelation::autocorrelation_coefficients;
use crate::config::FormantConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::fft::WindowType;
use crate::frame::AudioFrame;
use crate::lpc::{LpcModel, levinson_durbin, pre_emphasis, pre_emphasis_coefficient};

/// Margin kept below Nyquist when accepting poles, in Hz.
const NYQUIST_MARGIN_HZ: f64 = 50.0;

/// One vocal tract resonance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Formant {
    /// Center frequency in Hz.
    pub frequency: f32,
    /// 3 dB bandwidth in Hz.
    pub bandwidth: f32,
}

/// First three formants of a frame. Missing formants read 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormantsResult {
    /// First formant frequency in Hz.
    pub f1: f32,
    /// Second formant frequency in Hz.
    pub f2: f32,
    /// Third formant frequency in Hz.
    pub f3: f32,
    /// First formant bandwidth in Hz.
    pub bw1: f32,
    /// Second formant bandwidth in Hz.
    pub bw2: f32,
    /// Third formant bandwidth in Hz.
    pub bw3: f32,
}

impl FormantsResult {
    /// Result reported when no formant could be estimated.
    pub const NONE: Self = Self {
        f1: 0.0,
        f2: 0.0,
        f3: 0.0,
        bw1: 0.0,
        bw2: 0.0,
        bw3: 0.0,
    };

    /// Fill the slots from formants sorted by ascending frequency.
    pub fn from_formants(formants: &[Formant]) -> Self {
        let slot = |i: usize| formants.get(i).copied();
        let (f1, bw1) = slot(0).map_or((0.0, 0.0), |f| (f.frequency, f.bandwidth));
        let (f2, bw2) = slot(1).map_or((0.0, 0.0), |f| (f.frequency, f.bandwidth));
        let (f3, bw3) = slot(2).map_or((0.0, 0.0), |f| (f.frequency, f.bandwidth));
        Self {
            f1,
            f2,
            f3,
            bw1,
            bw2,
            bw3,
        }
    }

    /// Number of formants found (0 to 3).
    pub fn count(&self) -> usize {
        [self.f1, self.f2, self.f3].iter().filter(|&&f| f > 0.0).count()
    }
}

/// Default LPC order for a sample rate: two poles per kHz plus two.
pub fn default_lpc_order(sample_rate: f32) -> usize {
    2 + (sample_rate / 1000.0) as usize
}

/// LPC formant extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormantExtractor {
    config: FormantConfig,
}

impl FormantExtractor {
    /// Create an extractor with the given settings.
    pub fn new(config: FormantConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &FormantConfig {
        &self.config
    }

    /// Order actually used for a request on a frame of `len` samples.
    ///
    /// `0` selects [`default_lpc_order`]. The result lies in
    /// `[2, min(max_order, len / 2)]`.
    pub fn resolve_order(&self, requested: usize, sample_rate: f32, len: usize) -> AnalysisResult<usize> {
        let ceiling = self.config.max_order.min(len / 2);
        if ceiling < 2 {
            return Err(AnalysisError::invalid_input(format!(
                "frame of {len} samples is too short for LPC analysis"
            )));
        }
        let wanted = if requested == 0 {
            default_lpc_order(sample_rate)
        } else {
            requested
        };
        let order = wanted.clamp(2, ceiling);

        #[cfg(feature = "tracing")]
        if order != wanted {
            tracing::debug!(requested = wanted, order, "lpc order clamped");
        }

        Ok(order)
    }

    /// Fit the all-pole model of a frame.
    pub fn try_model(&self, frame: &AudioFrame<'_>, lpc_order: usize) -> AnalysisResult<LpcModel> {
        let samples = frame.require_samples()?;
        let sample_rate = frame.sample_rate();
        let order = self.resolve_order(lpc_order, sample_rate, samples.len())?;

        let alpha = pre_emphasis_coefficient(self.config.pre_emphasis_from_hz, sample_rate);
        let mut emphasized = pre_emphasis(samples, alpha);
        WindowType::Hamming.apply(&mut emphasized);

        let r = autocorrelation_coefficients(&emphasized, order);
        let model = levinson_durbin(&r, order)?;

        #[cfg(feature = "tracing")]
        if model.is_truncated() {
            tracing::debug!(
                requested = model.requested_order,
                effective = model.effective_order,
                "lpc recursion stopped early"
            );
        }

        Ok(model)
    }

    /// Candidate formants of a frame, sorted by ascending frequency.
    pub fn try_formants(&self, frame: &AudioFrame<'_>, lpc_order: usize) -> AnalysisResult<Vec<Formant>> {
        let model = self.try_model(frame, lpc_order)?;
        let sample_rate = f64::from(frame.sample_rate());
        let min_hz = f64::from(self.config.min_formant_hz);
        let max_hz = sample_rate / 2.0 - NYQUIST_MARGIN_HZ;
        let max_bandwidth = f64::from(self.config.max_bandwidth_hz);

        let mut formants: Vec<Formant> = model
            .poles()
            .into_iter()
            .filter(|z| z.im > 0.0)
            .filter_map(|z| {
                let frequency = z.arg() * sample_rate / (2.0 * PI);
                let bandwidth = -z.norm().ln() * sample_rate / PI;
                let in_band = (min_hz..=max_hz).contains(&frequency);
                let narrow = bandwidth > 0.0 && bandwidth <= max_bandwidth;
                (in_band && narrow).then_some(Formant {
                    frequency: frequency as f32,
                    bandwidth: bandwidth as f32,
                })
            })
            .collect();

        formants.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        Ok(formants)
    }

    /// Estimate F1-F3 of a frame, reporting why no estimate was possible.
    pub fn try_extract(&self, frame: &AudioFrame<'_>, lpc_order: usize) -> AnalysisResult<FormantsResult> {
        self.try_formants(frame, lpc_order)
            .map(|formants| FormantsResult::from_formants(&formants))
    }

    /// Estimate F1-F3 of a frame; failures yield [`FormantsResult::NONE`].
    pub fn extract(&self, frame: &AudioFrame<'_>, lpc_order: usize) -> FormantsResult {
        self.try_extract(frame, lpc_order).unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_err, "formant extraction failed");
            FormantsResult::NONE
        })
    }
}

/// Estimate F1-F3 with default settings. `lpc_order == 0` picks the order
/// from the sample rate.
pub fn extract_formants(frame: &AudioFrame<'_>, lpc_order: usize) -> FormantsResult {
    FormantExtractor::default().extract(frame, lpc_order)
}
