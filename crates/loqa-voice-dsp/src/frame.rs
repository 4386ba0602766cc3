//! Borrowed audio frame.

use crate::error::{AnalysisError, AnalysisResult};

/// Immutable view over a caller-owned block of mono samples.
///
/// The frame never copies or mutates the samples; it only pairs them with the
/// sample rate the analyzers need to convert lags and bins to Hz.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    samples: &'a [f32],
    sample_rate: f32,
}

impl<'a> AudioFrame<'a> {
    /// Create a frame, rejecting non-finite or non-positive sample rates.
    ///
    /// An empty sample slice is accepted here; each analyzer decides what an
    /// empty frame means for its own result.
    pub fn new(samples: &'a [f32], sample_rate: f32) -> AnalysisResult<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnalysisError::invalid_input(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Samples of the frame.
    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the frame holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    pub(crate) fn require_samples(&self) -> AnalysisResult<&'a [f32]> {
        if self.samples.is_empty() {
            Err(AnalysisError::invalid_input("empty sample buffer"))
        } else {
            Ok(self.samples)
        }
    }
}
