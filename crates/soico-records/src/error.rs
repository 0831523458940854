//! Error types for the record subsystem.

use thiserror::Error;

/// Errors that can occur in record operations.
#[derive(Error, Debug)]
pub enum RecordError {
    /// A required field was empty after sanitization
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the field
        field: &'static str,
    },

    /// A record with this slug already exists
    #[error("record already exists: {slug}")]
    DuplicateSlug {
        /// The conflicting slug
        slug: String,
    },

    /// No record with this slug
    #[error("record not found: {slug}")]
    NotFound {
        /// The slug that was not found
        slug: String,
    },

    /// A reorder request did not name existing records
    #[error("invalid order: {reason}")]
    InvalidOrder {
        /// Why the order was rejected
        reason: String,
    },

    /// Nothing was submitted
    #[error("no records submitted")]
    EmptySubmission,

    /// A stored document could not be decoded
    #[error("stored document '{key}' is malformed: {reason}")]
    Decode {
        /// Option key
        key: String,
        /// Decoder message
        reason: String,
    },

    /// Option store failure
    #[error("database error: {0}")]
    Database(#[from] soico_db::DatabaseError),
}

impl From<RecordError> for soico_core::CtaError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Database(e) => e.into(),
            other => Self::Record(other.to_string()),
        }
    }
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;
