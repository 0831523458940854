//! Schema for the option store.
//!
//! `001_options` holds the JSON documents, `002_transients` backs the
//! SQLite cache backend. Both are embedded at compile time.

use crate::error::{DatabaseError, Result};
use sqlx::{Pool, Sqlite};

/// Bring the schema up to date. Already applied steps are skipped.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    tracing::debug!(version = get_schema_version(pool).await?, "option store schema ready");
    Ok(())
}

/// Highest applied schema step, or 0 on a fresh file.
pub async fn get_schema_version(pool: &Pool<Sqlite>) -> Result<i64> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok(0);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;
    Ok(version.unwrap_or(0))
}
