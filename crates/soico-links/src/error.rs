//! Error types for the link-cloaking integration.

use thiserror::Error;

/// Errors that can occur when talking to the link service.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The service is not installed or not active
    #[error("link service is not active")]
    Inactive,

    /// The service could not answer
    #[error("link service unavailable: {0}")]
    Unavailable(String),

    /// Failed to read a link directory file
    #[error("failed to load link directory from {path}: {source}")]
    LoadError {
        /// Path to the directory file
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to parse a link directory file
    #[error("failed to parse link directory TOML in {path}: {source}")]
    ParseError {
        /// Path to the directory file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid link entity
    #[error("invalid link entity {id}: {reason}")]
    ValidationError {
        /// Raw id of the entity
        id: u64,
        /// Reason for validation failure
        reason: String,
    },

    /// Invalid configuration (site URL and friends)
    #[error(transparent)]
    Config(#[from] soico_core::ConfigError),
}

impl From<LinkError> for soico_core::CtaError {
    fn from(err: LinkError) -> Self {
        Self::Link(err.to_string())
    }
}

/// Result type for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;
