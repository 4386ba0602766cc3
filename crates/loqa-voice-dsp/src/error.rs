//! Error types for analysis and configuration.
//!
//! Analysis errors never escape the infallible entry points: every analyzer maps
//! them to its documented sentinel result. The fallible `try_*` methods expose
//! them for callers that want to know why a frame produced no estimate.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons an analysis could not produce an estimate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// The input buffer or parameters are unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The frame carries no energy, so ratios are undefined.
    #[error("zero-energy frame")]
    NumericDegenerate,

    /// The LPC recursion terminated before producing a usable pole.
    #[error("unstable LPC model: {0}")]
    UnstableModel(String),

    /// Requested transform length is not supported.
    #[error("unsupported FFT size {requested}: must be a power of two in [{min}, {max}]")]
    InvalidFftSize {
        /// Size requested by the caller.
        requested: usize,
        /// Smallest supported size.
        min: usize,
        /// Largest supported size.
        max: usize,
    },
}

impl AnalysisError {
    /// Create an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(reason.into())
    }
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A configuration value is outside its valid range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending field, e.g. `pitch.threshold`.
        field: String,
        /// Description of why the value is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
