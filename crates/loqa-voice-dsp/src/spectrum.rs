//! Magnitude spectra and spectral shape descriptors
//!
//! [`compute_spectrum`] produces an owned [`MagnitudeSpectrum`]; the free
//! functions [`spectral_centroid`], [`spectral_rolloff`] and [`spectral_tilt`]
//! work on any magnitude slice of length `fft_size / 2 + 1`, and
//! [`SpectralAnalyzer`] bundles all three for a single frame.

use crate::config::SpectralConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::fft::{Fft, WindowType, clamp_fft_size, fft_size_for_len, strict_fft_size};
use crate::frame::AudioFrame;
use crate::math::{AMPLITUDE_FLOOR, linear_to_db};

/// Owned magnitude spectrum of one frame.
///
/// Holds `fft_size / 2 + 1` non-negative magnitudes, or none for an empty
/// frame. Dropping the value releases the buffer; ownership can be handed to
/// foreign code with [`MagnitudeSpectrum::into_boxed_slice`].
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeSpectrum {
    magnitudes: Box<[f32]>,
    fft_size: usize,
    requested_fft_size: usize,
}

impl MagnitudeSpectrum {
    /// Spectrum with no bins, produced for empty input.
    pub fn empty(fft_size: usize) -> Self {
        Self {
            magnitudes: Box::default(),
            fft_size,
            requested_fft_size: fft_size,
        }
    }

    /// Bin magnitudes from DC to Nyquist.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Transform length actually used.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Transform length the caller asked for.
    pub fn requested_fft_size(&self) -> usize {
        self.requested_fft_size
    }

    /// True when the requested size was not supported and had to be clamped.
    pub fn was_clamped(&self) -> bool {
        self.fft_size != self.requested_fft_size
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// True when the spectrum holds no bins.
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Centre frequency of bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize, sample_rate: f32) -> f32 {
        k as f32 * sample_rate / self.fft_size as f32
    }

    /// Give up ownership of the magnitude buffer.
    pub fn into_boxed_slice(self) -> Box<[f32]> {
        self.magnitudes
    }
}

/// Compute the magnitude spectrum of `samples`.
///
/// The frame is truncated to the transform length, windowed over its own
/// length, zero-padded and transformed. Unsupported `fft_size` values are
/// clamped with [`clamp_fft_size`]; check [`MagnitudeSpectrum::was_clamped`].
/// Empty input yields an empty spectrum.
pub fn compute_spectrum(samples: &[f32], fft_size: usize, window: WindowType) -> MagnitudeSpectrum {
    let size = clamp_fft_size(fft_size);
    if size != fft_size {
        #[cfg(feature = "tracing")]
        tracing::warn!(requested = fft_size, used = size, "fft size clamped");
    }
    let mut spectrum = spectrum_with_size(samples, size, window);
    spectrum.requested_fft_size = fft_size;
    spectrum
}

/// Like [`compute_spectrum`] but rejects unsupported transform lengths.
pub fn compute_spectrum_strict(
    samples: &[f32],
    fft_size: usize,
    window: WindowType,
) -> AnalysisResult<MagnitudeSpectrum> {
    let size = strict_fft_size(fft_size)?;
    Ok(spectrum_with_size(samples, size, window))
}

fn spectrum_with_size(samples: &[f32], size: usize, window: WindowType) -> MagnitudeSpectrum {
    if samples.is_empty() {
        return MagnitudeSpectrum::empty(size);
    }
    let fft = Fft::new(size);
    MagnitudeSpectrum {
        magnitudes: fft.windowed_magnitudes(samples, window).into_boxed_slice(),
        fft_size: size,
        requested_fft_size: size,
    }
}

fn bin_width(spectrum: &[f32], sample_rate: f32) -> f32 {
    let fft_size = (spectrum.len() - 1) * 2;
    sample_rate / fft_size as f32
}

/// Compute spectral centroid (center of mass of spectrum)
///
/// Returns frequency in Hz, or 0 when the spectrum carries no magnitude.
pub fn spectral_centroid(spectrum: &[f32], sample_rate: f32) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let bin_width = bin_width(spectrum, sample_rate);

    let mut weighted_sum = 0.0f64;
    let mut magnitude_sum = 0.0f64;

    for (i, &mag) in spectrum.iter().enumerate() {
        let freq = f64::from(i as f32 * bin_width);
        weighted_sum += freq * f64::from(mag);
        magnitude_sum += f64::from(mag);
    }

    if magnitude_sum > 1e-10 {
        (weighted_sum / magnitude_sum) as f32
    } else {
        0.0
    }
}

/// Compute spectral rolloff: the lowest bin frequency at which the cumulative
/// magnitude reaches `rolloff_fraction` of the total.
///
/// Returns 0 for a silent spectrum.
pub fn spectral_rolloff(spectrum: &[f32], sample_rate: f32, rolloff_fraction: f32) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let bin_width = bin_width(spectrum, sample_rate);

    let total: f64 = spectrum.iter().map(|&m| f64::from(m)).sum();
    if total <= 1e-10 {
        return 0.0;
    }
    let threshold = total * f64::from(rolloff_fraction);

    let mut cumulative = 0.0f64;
    for (i, &mag) in spectrum.iter().enumerate() {
        cumulative += f64::from(mag);
        if cumulative >= threshold {
            return i as f32 * bin_width;
        }
    }

    sample_rate / 2.0 // Nyquist
}

/// Compute spectral tilt: least-squares slope of level (dB) against
/// log2-frequency, in dB per octave. The DC bin is excluded.
///
/// Returns 0 when fewer than two usable bins exist or the spectrum is silent.
pub fn spectral_tilt(spectrum: &[f32], sample_rate: f32) -> f32 {
    if spectrum.len() < 3 {
        return 0.0;
    }
    if spectrum.iter().all(|&m| m <= AMPLITUDE_FLOOR) {
        return 0.0;
    }
    let bin_width = bin_width(spectrum, sample_rate);

    let points = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, &m)| {
            let x = f64::from((k as f32 * bin_width).log2());
            let y = f64::from(linear_to_db(m));
            (x, y)
        });

    let n = (spectrum.len() - 1) as f64;
    let (sum_x, sum_y) = points
        .clone()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let (sxy, sxx) = points.fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });

    if sxx <= f64::EPSILON {
        0.0
    } else {
        (sxy / sxx) as f32
    }
}

/// Spectral shape descriptors of one frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectrumResult {
    /// Magnitude-weighted mean frequency in Hz.
    pub centroid: f32,
    /// Frequency in Hz below which the configured fraction of magnitude lies.
    pub rolloff: f32,
    /// Spectral slope in dB per octave.
    pub tilt: f32,
}

/// Computes centroid, rolloff and tilt for a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralAnalyzer {
    config: SpectralConfig,
}

impl SpectralAnalyzer {
    /// Create an analyzer with the given settings.
    pub fn new(config: SpectralConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Analyze a frame, reporting why no descriptors could be computed.
    pub fn try_analyze(&self, frame: &AudioFrame<'_>) -> AnalysisResult<SpectrumResult> {
        let samples = frame.require_samples()?;
        let spectrum = compute_spectrum(samples, fft_size_for_len(samples.len()), self.config.window);
        self.try_describe(&spectrum, frame.sample_rate())
    }

    /// Describe a precomputed spectrum.
    pub fn try_describe(
        &self,
        spectrum: &MagnitudeSpectrum,
        sample_rate: f32,
    ) -> AnalysisResult<SpectrumResult> {
        let mags = spectrum.magnitudes();
        if mags.len() < 2 {
            return Err(AnalysisError::invalid_input("spectrum has fewer than two bins"));
        }
        let total: f32 = mags.iter().sum();
        if total <= 1e-10 {
            return Err(AnalysisError::NumericDegenerate);
        }
        Ok(SpectrumResult {
            centroid: spectral_centroid(mags, sample_rate),
            rolloff: spectral_rolloff(mags, sample_rate, self.config.rolloff_fraction),
            tilt: spectral_tilt(mags, sample_rate),
        })
    }

    /// Analyze a frame; invalid or silent input yields all zeros.
    pub fn analyze(&self, frame: &AudioFrame<'_>) -> SpectrumResult {
        self.try_analyze(frame).unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_err, "spectral analysis fell back to zeros");
            SpectrumResult::default()
        })
    }
}

/// Analyze the spectral shape of a frame with default settings.
pub fn analyze_spectrum(frame: &AudioFrame<'_>) -> SpectrumResult {
    SpectralAnalyzer::default().analyze(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_spectral_centroid_pure_tone() {
        let sample_rate = 44100.0;
        let freq = 1000.0;
        let fft_size = 4096;

        let signal = sine(freq, sample_rate, fft_size);
        let spectrum = compute_spectrum(&signal, fft_size, WindowType::Hann);
        let centroid = spectral_centroid(spectrum.magnitudes(), sample_rate);

        // Centroid should be near the fundamental frequency
        assert!(
            (centroid - freq).abs() < 50.0,
            "Centroid {} should be near {}",
            centroid,
            freq
        );
    }

    #[test]
    fn test_spectrum_length_and_sign() {
        let signal = sine(440.0, 44100.0, 2048);
        let spectrum = compute_spectrum(&signal, 1024, WindowType::Hamming);
        assert_eq!(spectrum.len(), 513);
        assert_eq!(spectrum.fft_size(), 1024);
        assert!(!spectrum.was_clamped());
        assert!(spectrum.magnitudes().iter().all(|&m| m >= 0.0 && m.is_finite()));
    }

    #[test]
    fn test_unsupported_size_is_clamped() {
        let signal = sine(440.0, 44100.0, 1024);
        let spectrum = compute_spectrum(&signal, 1000, WindowType::Hann);
        assert_eq!(spectrum.fft_size(), 1024);
        assert_eq!(spectrum.requested_fft_size(), 1000);
        assert!(spectrum.was_clamped());
        assert_eq!(spectrum.len(), 513);

        assert!(compute_spectrum_strict(&signal, 1000, WindowType::Hann).is_err());
    }

    #[test]
    fn test_empty_input_gives_empty_spectrum() {
        let spectrum = compute_spectrum(&[], 512, WindowType::Hann);
        assert!(spectrum.is_empty());
        assert_eq!(spectrum.into_boxed_slice().len(), 0);
    }

    #[test]
    fn test_rolloff_single_bin() {
        // All magnitude in bin 10 of a 64-point spectrum
        let mut mags = vec![0.0f32; 33];
        mags[10] = 1.0;
        let rolloff = spectral_rolloff(&mags, 6400.0, 0.85);
        assert!((rolloff - 1000.0).abs() < 1e-3, "rolloff {rolloff}");
    }

    #[test]
    fn test_tilt_of_power_law() {
        // Magnitude falling as 1/f is -6.02 dB per octave.
        let mags: Vec<f32> = (0..513)
            .map(|k| if k == 0 { 1.0 } else { 1.0 / k as f32 })
            .collect();
        let tilt = spectral_tilt(&mags, 16000.0);
        assert!((tilt + 6.02).abs() < 0.05, "tilt {tilt}");
    }

    #[test]
    fn test_silent_frame_yields_zeros() {
        let silence = vec![0.0f32; 1024];
        let frame = AudioFrame::new(&silence, 16000.0).unwrap();
        let analyzer = SpectralAnalyzer::default();
        assert_eq!(
            analyzer.try_analyze(&frame),
            Err(AnalysisError::NumericDegenerate)
        );
        assert_eq!(analyzer.analyze(&frame), SpectrumResult::default());
    }

    #[test]
    fn test_degenerate_slices() {
        assert_eq!(spectral_centroid(&[], 16000.0), 0.0);
        assert_eq!(spectral_rolloff(&[1.0], 16000.0, 0.85), 0.0);
        assert_eq!(spectral_tilt(&[0.0; 10], 16000.0), 0.0);
    }
}
