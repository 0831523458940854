//! Core error types for the SOICO CTA workspace.
//!
//! `CtaError` is the shared error type for cross-crate failures; each
//! subsystem crate keeps its own richer enum and converts at the boundary.

use thiserror::Error;

/// Central error type shared by the CTA crates.
#[derive(Error, Debug)]
pub enum CtaError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Option store / transient store errors
    #[error("database error: {0}")]
    Database(String),

    /// Link-cloaking service errors
    #[error("link service error: {0}")]
    Link(String),

    /// Record store errors (sanitization, persistence)
    #[error("record error: {0}")]
    Record(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `CtaError`.
pub type Result<T> = std::result::Result<T, CtaError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
