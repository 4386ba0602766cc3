//! FFT wrapper with windowing functions and transform-size policy

use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::{AnalysisError, AnalysisResult};

/// Smallest supported transform length.
pub const MIN_FFT_SIZE: usize = 256;
/// Largest supported transform length.
pub const MAX_FFT_SIZE: usize = 8192;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
    /// Blackman-Harris window (better sidelobe suppression)
    BlackmanHarris,
}

impl WindowType {
    /// Decode the integer window code used at the C boundary.
    ///
    /// `0` rectangular, `1` hann, `2` hamming, `3` blackman, `4` blackman-harris.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(WindowType::Rectangular),
            1 => Some(WindowType::Hann),
            2 => Some(WindowType::Hamming),
            3 => Some(WindowType::Blackman),
            4 => Some(WindowType::BlackmanHarris),
            _ => None,
        }
    }

    /// Integer code of this window at the C boundary.
    pub fn code(self) -> i32 {
        match self {
            WindowType::Rectangular => 0,
            WindowType::Hann => 1,
            WindowType::Hamming => 2,
            WindowType::Blackman => 3,
            WindowType::BlackmanHarris => 4,
        }
    }

    /// Window coefficient at index `i` of an `n`-point periodic window.
    #[inline]
    pub fn coefficient(self, i: usize, n: usize) -> f32 {
        let x = 2.0 * PI * i as f32 / n.max(1) as f32;
        match self {
            WindowType::Rectangular => 1.0,
            WindowType::Hann => 0.5 * (1.0 - x.cos()),
            WindowType::Hamming => 0.54 - 0.46 * x.cos(),
            WindowType::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
            WindowType::BlackmanHarris => {
                0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos()
                    - 0.01168 * (3.0 * x).cos()
            }
        }
    }

    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f32]) {
        if *self == WindowType::Rectangular {
            return;
        }
        let n = buffer.len();
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.coefficient(i, n);
        }
    }

    /// Sum of the window coefficients over `size` points (coherent gain times size).
    pub fn coherent_sum(&self, size: usize) -> f32 {
        (0..size).map(|i| self.coefficient(i, size)).sum()
    }
}

/// Map any requested transform length onto a supported one.
///
/// Picks the nearest power of two (ties round up) and clamps it to
/// [`MIN_FFT_SIZE`, `MAX_FFT_SIZE`].
pub fn clamp_fft_size(requested: usize) -> usize {
    if requested <= MIN_FFT_SIZE {
        return MIN_FFT_SIZE;
    }
    if requested >= MAX_FFT_SIZE {
        return MAX_FFT_SIZE;
    }
    let upper = requested.next_power_of_two();
    let lower = upper / 2;
    let nearest = if requested - lower < upper - requested {
        lower
    } else {
        upper
    };
    nearest.clamp(MIN_FFT_SIZE, MAX_FFT_SIZE)
}

/// Accept only supported transform lengths.
pub fn strict_fft_size(requested: usize) -> AnalysisResult<usize> {
    if requested.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&requested) {
        Ok(requested)
    } else {
        Err(AnalysisError::InvalidFftSize {
            requested,
            min: MIN_FFT_SIZE,
            max: MAX_FFT_SIZE,
        })
    }
}

/// Smallest supported transform that holds `len` samples without truncation
/// (capped at [`MAX_FFT_SIZE`]).
pub fn fft_size_for_len(len: usize) -> usize {
    len.max(1)
        .next_power_of_two()
        .clamp(MIN_FFT_SIZE, MAX_FFT_SIZE)
}

/// Forward FFT processor for one transform length.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of non-negative frequency bins (`size / 2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Perform forward FFT on real input
    ///
    /// Input longer than the transform is truncated, shorter input is
    /// zero-padded. Returns complex spectrum (size/2 + 1 bins for positive frequencies)
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();

        // Pad or truncate to FFT size
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        // Return only positive frequencies (DC to Nyquist)
        buffer.truncate(self.num_bins());
        buffer
    }

    /// Window the first `size` samples of `input` over their own length,
    /// zero-pad, transform and return bin magnitudes.
    pub fn windowed_magnitudes(&self, input: &[f32], window: WindowType) -> Vec<f32> {
        let frame = &input[..input.len().min(self.size)];
        let mut windowed = frame.to_vec();
        window.apply(&mut windowed);
        self.forward(&windowed).iter().map(|c| c.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_hann() {
        let mut buffer = vec![1.0; 100];
        WindowType::Hann.apply(&mut buffer);

        // Hann window should be 0 at the start, 1 at center
        assert!(buffer[0] < 0.01);
        assert!(buffer[99] < 0.01);
        assert!((buffer[50] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_window_codes_roundtrip() {
        for code in 0..5 {
            let window = WindowType::from_code(code).unwrap();
            assert_eq!(window.code(), code);
        }
        assert_eq!(WindowType::from_code(5), None);
        assert_eq!(WindowType::from_code(-1), None);
    }

    #[test]
    fn test_rectangular_is_identity() {
        let mut buffer = vec![0.3; 32];
        WindowType::Rectangular.apply(&mut buffer);
        assert!(buffer.iter().all(|&x| x == 0.3));
        assert_eq!(WindowType::Rectangular.coherent_sum(32), 32.0);
    }

    #[test]
    fn test_clamp_fft_size() {
        assert_eq!(clamp_fft_size(0), 256);
        assert_eq!(clamp_fft_size(128), 256);
        assert_eq!(clamp_fft_size(512), 512);
        assert_eq!(clamp_fft_size(500), 512);
        assert_eq!(clamp_fft_size(700), 512);
        assert_eq!(clamp_fft_size(800), 1024);
        assert_eq!(clamp_fft_size(768), 1024);
        assert_eq!(clamp_fft_size(16384), 8192);
    }

    #[test]
    fn test_strict_fft_size() {
        assert_eq!(strict_fft_size(1024), Ok(1024));
        assert!(strict_fft_size(1000).is_err());
        assert!(strict_fft_size(128).is_err());
        assert!(strict_fft_size(16384).is_err());
    }

    #[test]
    fn test_fft_size_for_len() {
        assert_eq!(fft_size_for_len(0), 256);
        assert_eq!(fft_size_for_len(300), 512);
        assert_eq!(fft_size_for_len(2048), 2048);
        assert_eq!(fft_size_for_len(100_000), 8192);
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);

        // DC signal
        let input = vec![1.0; 256];
        let spectrum = fft.forward(&input);
        assert_eq!(spectrum.len(), 129);

        // DC bin should be large, others small
        let dc_mag = spectrum[0].norm();
        let other_mag: f32 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!(dc_mag > other_mag * 10.0);
    }

    #[test]
    fn test_windowed_magnitudes_truncates_long_input() {
        let fft = Fft::new(256);
        let input = vec![0.5; 1000];
        let mags = fft.windowed_magnitudes(&input, WindowType::Rectangular);
        assert_eq!(mags.len(), 129);
        assert!((mags[0] - 128.0).abs() < 1e-2, "DC = {}", mags[0]);
    }
}
