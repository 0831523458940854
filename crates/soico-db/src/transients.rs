//! Time-bounded cache entries ("transients").
//!
//! Transients are a pure performance layer: every failure inside a store is
//! reported to the typed [`Transients`] wrapper, which logs it and behaves as
//! a miss. Three backends exist: process memory (moka), the `transients`
//! table, and a disabled store that never hits.

use crate::error::{DatabaseError, Result};
use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Backend for transient entries.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Fetch a live entry; expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store an entry for `ttl`.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()>;

    /// Drop an entry if present.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-process transients backed by a moka cache.
#[derive(Clone)]
pub struct MemoryTransients {
    entries: Cache<String, (Value, Instant)>,
}

impl MemoryTransients {
    /// Create a store holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }
}

impl Default for MemoryTransients {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl TransientStore for MemoryTransients {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.entries.get(key).await {
            Some((value, deadline)) if Instant::now() < deadline => Ok(Some(value)),
            Some(_) => {
                self.entries.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let deadline = Instant::now() + ttl;
        self.entries
            .insert(key.to_string(), (value.clone(), deadline))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}

/// Transients persisted in the `transients` table.
#[derive(Debug, Clone)]
pub struct SqliteTransients {
    pool: SqlitePool,
}

impl SqliteTransients {
    /// Create a store over an already-migrated pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransientStore for SqliteTransients {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT value, expires_at FROM transients WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some((raw, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= chrono::Utc::now().timestamp() {
            self.delete(key).await?;
            return Ok(None);
        }

        let value = serde_json::from_str(&raw)
            .map_err(|e| DatabaseError::Decode(format!("transient '{key}': {e}")))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| DatabaseError::Encode(e.to_string()))?;
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = chrono::Utc::now().timestamp().saturating_add(ttl_secs);

        sqlx::query(
            r"
            INSERT INTO transients (key, value, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at
            ",
        )
        .bind(key)
        .bind(raw)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM transients WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// A store that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTransients;

#[async_trait]
impl TransientStore for DisabledTransients {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Typed, failure-tolerant front for a [`TransientStore`].
#[derive(Clone)]
pub struct Transients {
    store: Arc<dyn TransientStore>,
}

impl Transients {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn TransientStore>) -> Self {
        Self { store }
    }

    /// Process-local transients.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryTransients::default()))
    }

    /// Transients that always miss.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledTransients))
    }

    /// Fetch and decode an entry. Store and decode failures count as misses.
    pub async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.store.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key, "transient miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "transient read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(decoded) => {
                debug!(key, "transient hit");
                Some(decoded)
            }
            Err(e) => {
                warn!(key, error = %e, "transient has unexpected shape, treating as miss");
                None
            }
        }
    }

    /// Encode and store an entry. Failures are logged and dropped.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key, error = %e, "could not encode transient");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &encoded, ttl).await {
            warn!(key, error = %e, "transient write failed");
        }
    }

    /// Drop an entry. Failures are logged and dropped.
    pub async fn forget(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!(key, error = %e, "transient delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use serde_json::json;

    struct FailingStore;

    #[async_trait]
    impl TransientStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(DatabaseError::Open("offline".to_string()))
        }

        async fn set(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<()> {
            Err(DatabaseError::Open("offline".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(DatabaseError::Open("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let transients = Transients::memory();
        transients
            .put("k", &vec!["a".to_string()], Duration::from_secs(60))
            .await;

        let cached: Option<Vec<String>> = transients.fetch("k").await;
        assert_eq!(cached, Some(vec!["a".to_string()]));

        transients.forget("k").await;
        assert_eq!(transients.fetch::<Vec<String>>("k").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_entry_expires() {
        let store = MemoryTransients::default();
        store
            .set("k", &json!(1), Duration::from_secs(10))
            .await
            .expect("set");

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("k").await.expect("get"), Some(json!(1)));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_sqlite_round_trip_and_expiry() {
        let db = Database::in_memory().await.expect("create db");
        let store = SqliteTransients::new(db.pool().clone());

        store
            .set("live", &json!({"a": 1}), Duration::from_secs(3600))
            .await
            .expect("set live");
        assert_eq!(store.get("live").await.expect("get"), Some(json!({"a": 1})));

        store
            .set("dead", &json!(true), Duration::ZERO)
            .await
            .expect("set dead");
        assert_eq!(store.get("dead").await.expect("get"), None);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transients")
            .fetch_one(db.pool())
            .await
            .expect("count");
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn test_disabled_never_hits() {
        let transients = Transients::disabled();
        transients.put("k", &1_u32, Duration::from_secs(60)).await;
        assert_eq!(transients.fetch::<u32>("k").await, None);
    }

    #[tokio::test]
    async fn test_store_failure_is_a_miss() {
        let transients = Transients::new(Arc::new(FailingStore));
        transients.put("k", &1_u32, Duration::from_secs(60)).await;
        transients.forget("k").await;
        assert_eq!(transients.fetch::<u32>("k").await, None);
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_a_miss() {
        let transients = Transients::memory();
        transients.put("k", &"text", Duration::from_secs(60)).await;
        assert_eq!(transients.fetch::<Vec<u32>>("k").await, None);
    }
}
