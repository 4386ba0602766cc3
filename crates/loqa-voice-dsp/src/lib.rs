//! Loqa Voice DSP - per-frame voice feature extraction
//!
//! This crate measures acoustic features of a single frame of mono speech:
//!
//! - [`fft`] - FFT wrapper with windowing functions and size policy
//! - [`spectrum`] - Magnitude spectra, centroid, rolloff and tilt
//! - [`autocorrelation`] - Normalized autocorrelation shared by the analyzers
//! - [`pitch`] - YIN fundamental frequency estimation
//! - [`lpc`] - Linear prediction (Levinson-Durbin, polynomial roots)
//! - [`formant`] - Formant frequencies and bandwidths from LPC poles
//! - [`hnr`] - Harmonics-to-noise ratio
//! - [`h1h2`] - First/second harmonic amplitude difference
//! - [`config`] - TOML-backed analyzer settings
//!
//! Every analyzer is a small struct holding its settings. The `try_*` methods
//! report why a frame could not be measured; the plain methods and the free
//! functions map failures to a documented sentinel result, which is what the
//! C interface exposes.
//!
//! ## Example
//!
//! ```rust
//! use loqa_voice_dsp::{AudioFrame, detect_pitch, calculate_hnr};
//!
//! let sample_rate = 16000.0;
//! let tone: Vec<f32> = (0..2048)
//!     .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate).sin())
//!     .collect();
//! let frame = AudioFrame::new(&tone, sample_rate).unwrap();
//!
//! let pitch = detect_pitch(&frame);
//! assert!(pitch.is_voiced);
//! assert!((pitch.frequency - 220.0).abs() < 2.2);
//!
//! let hnr = calculate_hnr(&frame, 75.0, 500.0);
//! assert!(hnr.hnr > 10.0);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use loqa_voice_dsp::{AnalysisConfig, PitchDetector};
//!
//! let config = AnalysisConfig::from_toml("[pitch]\nmax_frequency = 500.0").unwrap();
//! let detector = PitchDetector::new(config.pitch);
//! assert_eq!(detector.config().max_frequency, 500.0);
//! ```
//!
//! ## Logging
//!
//! With the `tracing` feature enabled, parameter clamps are logged at `warn`
//! or `debug` and sentinel fallbacks at `debug`. The crate never installs a
//! subscriber.

pub mod autocorrelation;
pub mod config;
pub mod error;
pub mod fft;
pub mod formant;
pub mod frame;
pub mod h1h2;
pub mod hnr;
pub mod lpc;
pub mod math;
pub mod pitch;
pub mod spectrum;

// Re-export main types
pub use config::{AnalysisConfig, FormantConfig, H1H2Config, HnrConfig, PitchConfig, SpectralConfig};
pub use error::{AnalysisError, AnalysisResult, ConfigError};
pub use fft::{Fft, MAX_FFT_SIZE, MIN_FFT_SIZE, WindowType};
pub use formant::{Formant, FormantExtractor, FormantsResult, extract_formants};
pub use frame::AudioFrame;
pub use h1h2::{H1H2Analyzer, H1H2Result, calculate_h1h2};
pub use hnr::{HnrAnalyzer, HnrResult, calculate_hnr};
pub use lpc::LpcModel;
pub use pitch::{PitchDetector, PitchResult, detect_pitch};
pub use spectrum::{
    MagnitudeSpectrum, SpectralAnalyzer, SpectrumResult, analyze_spectrum, compute_spectrum,
    compute_spectrum_strict, spectral_centroid, spectral_rolloff, spectral_tilt,
};
