//! Tunable analysis thresholds.
//!
//! Every analyzer is built from one section of [`AnalysisConfig`]. The defaults
//! follow the literature: YIN's absolute threshold of 0.1, Boersma's voicing
//! threshold of 0.3 for harmonicity, an 85% rolloff point and a 400 Hz formant
//! bandwidth ceiling.
//!
//! # TOML Format
//!
//! ```toml
//! [pitch]
//! min_frequency = 60.0
//! max_frequency = 500.0
//! threshold = 0.15
//!
//! [formant]
//! max_bandwidth_hz = 500.0
//!
//! [spectral]
//! rolloff_fraction = 0.9
//! window = "hamming"
//! ```
//!
//! Missing sections and fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::fft::WindowType;

/// YIN pitch detector settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Lowest detectable pitch in Hz; sets the longest lag.
    pub min_frequency: f32,
    /// Highest detectable pitch in Hz; sets the shortest lag.
    pub max_frequency: f32,
    /// Absolute threshold on the cumulative mean normalized difference.
    pub threshold: f32,
    /// Confidence (1 - d') a frame must exceed to count as voiced.
    ///
    /// An accepted lag already has `d' < threshold`, so its confidence is
    /// above `1 - threshold`. With the default `threshold` of 0.1 this gate
    /// only rejects anything when raised above 0.9.
    pub voicing_threshold: f32,
    /// Frames with RMS below this level are reported as unvoiced.
    pub silence_rms: f32,
    /// Lowest accepted sample rate in Hz.
    pub min_sample_rate: f32,
    /// Highest accepted sample rate in Hz.
    pub max_sample_rate: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            min_frequency: 50.0,
            max_frequency: 1000.0,
            threshold: 0.1,
            voicing_threshold: 0.5,
            silence_rms: 1e-5,
            min_sample_rate: 8000.0,
            max_sample_rate: 48000.0,
        }
    }
}

/// LPC formant extractor settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormantConfig {
    /// Upper bound on the LPC order regardless of what the caller asks for.
    pub max_order: usize,
    /// Poles wider than this are treated as spectral shaping, not formants.
    pub max_bandwidth_hz: f32,
    /// Poles below this frequency are discarded.
    pub min_formant_hz: f32,
    /// Pre-emphasis corner in Hz; 0 disables pre-emphasis.
    pub pre_emphasis_from_hz: f32,
}

impl Default for FormantConfig {
    fn default() -> Self {
        Self {
            max_order: 32,
            max_bandwidth_hz: 400.0,
            min_formant_hz: 50.0,
            pre_emphasis_from_hz: 50.0,
        }
    }
}

/// Spectral shape analyzer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Fraction of total magnitude that defines the rolloff frequency.
    pub rolloff_fraction: f32,
    /// Window applied before the transform.
    pub window: WindowType,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            rolloff_fraction: 0.85,
            window: WindowType::Hann,
        }
    }
}

/// Harmonics-to-noise ratio settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnrConfig {
    /// Peak autocorrelation above which a frame is voiced.
    pub voicing_threshold: f32,
    /// Frames with RMS below this level produce the unvoiced sentinel.
    pub silence_rms: f32,
}

impl Default for HnrConfig {
    fn default() -> Self {
        Self {
            voicing_threshold: 0.3,
            silence_rms: 1e-5,
        }
    }
}

/// H1-H2 analyzer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct H1H2Config {
    /// Half-width of the search window around each harmonic, as a fraction
    /// of f0 (the same width for H1 and H2).
    pub search_fraction: f32,
    /// Minimum transform length; short frames are zero-padded up to it.
    pub min_fft_size: usize,
}

impl Default for H1H2Config {
    fn default() -> Self {
        Self {
            search_fraction: 0.1,
            min_fft_size: 4096,
        }
    }
}

/// Settings for every analyzer in the crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pitch detector section.
    pub pitch: PitchConfig,
    /// Formant extractor section.
    pub formant: FormantConfig,
    /// Spectral analyzer section.
    pub spectral: SpectralConfig,
    /// Harmonicity section.
    pub hnr: HnrConfig,
    /// H1-H2 section.
    pub h1h2: H1H2Config,
}

impl AnalysisConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section for values the analyzers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pitch;
        positive("pitch.min_frequency", p.min_frequency)?;
        if !(p.max_frequency > p.min_frequency) {
            return Err(ConfigError::invalid_value(
                "pitch.max_frequency",
                format!("must exceed min_frequency ({})", p.min_frequency),
            ));
        }
        unit_open("pitch.threshold", p.threshold)?;
        unit_closed("pitch.voicing_threshold", p.voicing_threshold)?;
        non_negative("pitch.silence_rms", p.silence_rms)?;
        positive("pitch.min_sample_rate", p.min_sample_rate)?;
        if !(p.max_sample_rate >= p.min_sample_rate) {
            return Err(ConfigError::invalid_value(
                "pitch.max_sample_rate",
                "must not be below min_sample_rate",
            ));
        }

        let f = &self.formant;
        if f.max_order < 2 {
            return Err(ConfigError::invalid_value(
                "formant.max_order",
                "must be at least 2",
            ));
        }
        positive("formant.max_bandwidth_hz", f.max_bandwidth_hz)?;
        non_negative("formant.min_formant_hz", f.min_formant_hz)?;
        non_negative("formant.pre_emphasis_from_hz", f.pre_emphasis_from_hz)?;

        unit_open("spectral.rolloff_fraction", self.spectral.rolloff_fraction)?;

        unit_open("hnr.voicing_threshold", self.hnr.voicing_threshold)?;
        non_negative("hnr.silence_rms", self.hnr.silence_rms)?;

        let h = &self.h1h2;
        if !(h.search_fraction > 0.0 && h.search_fraction < 0.5) {
            return Err(ConfigError::invalid_value(
                "h1h2.search_fraction",
                "must be in (0, 0.5) so harmonic windows do not overlap",
            ));
        }
        if h.min_fft_size == 0 {
            return Err(ConfigError::invalid_value(
                "h1h2.min_fft_size",
                "must be positive",
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            field,
            format!("must be positive, got {value}"),
        ))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            field,
            format!("must not be negative, got {value}"),
        ))
    }
}

fn unit_open(field: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            field,
            format!("must be in (0, 1), got {value}"),
        ))
    }
}

fn unit_closed(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            field,
            format!("must be in [0, 1], got {value}"),
        ))
    }
}
