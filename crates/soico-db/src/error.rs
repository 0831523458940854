//! Option store errors.

use thiserror::Error;

/// Errors raised by the option store and the SQLite transient backend.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database file could not be opened or created.
    #[error("cannot open option store: {0}")]
    Open(String),

    /// Schema setup failed.
    #[error("schema setup failed: {0}")]
    Migration(String),

    /// A stored value is not the JSON it should be.
    #[error("stored value is corrupt: {0}")]
    Decode(String),

    /// A value could not be encoded as JSON.
    #[error("cannot encode value: {0}")]
    Encode(String),

    /// Query failure.
    #[error("query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Filesystem failure while preparing the database directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DatabaseError> for soico_core::CtaError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err.to_string())
    }
}

/// Option store result.
pub type Result<T> = std::result::Result<T, DatabaseError>;
