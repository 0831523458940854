//! Option store: one JSON document per key.
//!
//! Record collections and settings are each persisted as a single document
//! under a versioned key. Writes report whether anything actually changed so
//! callers never confuse "nothing to do" with "write failed".

use crate::error::{DatabaseError, Result};
use serde_json::Value;
use sqlx::SqlitePool;

/// What a `set_option` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The stored document was created or replaced.
    Written,
    /// The stored document already held exactly this value.
    Unchanged,
}

fn encode(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Encode(e.to_string()))
}

fn decode(key: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| DatabaseError::Decode(format!("option '{key}' is not valid JSON: {e}")))
}

/// Create or replace an option.
pub async fn set_option(pool: &SqlitePool, key: &str, value: &Value) -> Result<WriteOutcome> {
    let value_str = encode(value)?;

    let current: Option<(String,)> = sqlx::query_as("SELECT value FROM options WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    if current.is_some_and(|(stored,)| stored == value_str) {
        tracing::debug!(key, "option unchanged, skipping write");
        return Ok(WriteOutcome::Unchanged);
    }

    sqlx::query(
        r"
        INSERT INTO options (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        ",
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(WriteOutcome::Written)
}

/// Insert an option only if the key is absent. Returns `true` if inserted.
pub async fn add_option(pool: &SqlitePool, key: &str, value: &Value) -> Result<bool> {
    let value_str = encode(value)?;

    let result = sqlx::query(
        r"
        INSERT INTO options (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO NOTHING
        ",
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Get an option.
pub async fn get_option(pool: &SqlitePool, key: &str) -> Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as(
        r"
        SELECT value
        FROM options
        WHERE key = ?
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    row.map(|(value_str,)| decode(key, &value_str)).transpose()
}

/// Delete an option. Returns `true` if it existed.
pub async fn delete_option(pool: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query(
        r"
        DELETE FROM options
        WHERE key = ?
        ",
    )
    .bind(key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
