//! Error types for widget rendering.

use soico_records::RecordError;
use thiserror::Error;

/// Errors raised while dispatching or rendering a block.
///
/// A record that is missing or has no usable URL is not an error; the
/// widget renders empty output instead.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The block name is not one of the registered widgets
    #[error("unknown block: {name}")]
    UnknownBlock {
        /// Name as given by the caller
        name: String,
    },

    /// The attribute bag could not be decoded for the block
    #[error("invalid attributes for {block}: {reason}")]
    InvalidAttributes {
        /// Block name
        block: String,
        /// Decoder message
        reason: String,
    },

    /// Record or settings lookup failed
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl From<RenderError> for soico_core::CtaError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Record(e) => e.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
