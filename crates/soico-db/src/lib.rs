//! SOICO CTA Database Layer
//!
//! Provides the SQLite-backed option store (one JSON document per key) and
//! the transient cache used in front of record and link lookups.
//!
//! # Architecture
//!
//! - **Options** ([`options`]): flat key-value documents, writes report `Written`/`Unchanged`
//! - **Transients** ([`transients`]): TTL cache with memory, database and disabled backends
//! - **Migrations** ([`migrations`]): embedded and versioned using `SQLx`
//!
//! # Example
//!
//! ```ignore
//! use soico_db::{options, Database};
//!
//! let db = Database::open("soico-cta.db").await?;
//! let design = options::get_option(db.pool(), "soico_cta_v1_securities_design").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod options;
pub mod transients;

// Re-export commonly used types
pub use connection::OptionPool;
pub use error::{DatabaseError, Result};
pub use options::WriteOutcome;
pub use transients::{
    DisabledTransients, MemoryTransients, SqliteTransients, TransientStore, Transients,
};

use soico_core::{CacheBackend, CacheConfig};
use std::path::Path;
use std::sync::Arc;

/// High-level database handle: a migrated option store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: OptionPool,
}

impl Database {
    /// Open the database at `path` without running migrations.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = OptionPool::new(path).await?;
        Ok(Self { pool })
    }

    /// Open the database at `path` and bring its schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::new(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open a migrated in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let db = Self {
            pool: OptionPool::in_memory().await?,
        };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Build the transient cache described by `cache`.
    #[must_use]
    pub fn transients(&self, cache: &CacheConfig) -> Transients {
        if !cache.enabled {
            return Transients::disabled();
        }

        match cache.backend {
            CacheBackend::Memory => Transients::memory(),
            CacheBackend::Database => {
                Transients::new(Arc::new(SqliteTransients::new(self.pool().clone())))
            }
        }
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
