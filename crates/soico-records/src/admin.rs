//! Admin mutation surface.
//!
//! Every operation returns an [`AdminResponse`] instead of an error, matching
//! the JSON envelope the admin screens expect.

use crate::{
    error::RecordError,
    record::NewRecord,
    store::RecordStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use soico_core::sanitize::{sanitize_key, sanitize_text};
use tracing::warn;

/// Tagged success/failure result for admin operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// User-facing message
    pub message: String,
    /// Whether the admin screen should reload
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reload: bool,
    /// Machine-readable failure code (e.g. `DUPLICATE_SLUG`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AdminResponse {
    /// A successful response.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            reload: false,
            code: None,
        }
    }

    /// A failed response with a code.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            reload: false,
            code: Some(code.into()),
        }
    }

    /// Ask the admin screen to reload.
    #[must_use]
    pub fn with_reload(mut self) -> Self {
        self.reload = true;
        self
    }
}

/// Error code for a record error.
fn error_code(err: &RecordError) -> &'static str {
    match err {
        RecordError::EmptyField { .. } | RecordError::EmptySubmission => "VALIDATION_ERROR",
        RecordError::DuplicateSlug { .. } => "DUPLICATE_SLUG",
        RecordError::NotFound { .. } => "NOT_FOUND",
        RecordError::InvalidOrder { .. } => "INVALID_ORDER",
        RecordError::Decode { .. } | RecordError::Database(_) => "STORAGE_ERROR",
    }
}

/// Admin operations over one record store.
#[derive(Clone)]
pub struct AdminService {
    store: RecordStore,
}

impl AdminService {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Bulk save of the full collection.
    pub async fn save(&self, submitted: &Value) -> AdminResponse {
        let Some(records) = submitted.as_object().filter(|map| !map.is_empty()) else {
            return AdminResponse::failure(
                error_code(&RecordError::EmptySubmission),
                "データが送信されていません",
            );
        };

        match self.store.save(records).await {
            Ok(_) => AdminResponse::ok("保存しました"),
            Err(e) => {
                warn!(family = %self.store.family(), error = %e, "save failed");
                AdminResponse::failure(error_code(&e), "保存に失敗しました")
            }
        }
    }

    /// Add a record with just a slug and a name; it starts enabled.
    pub async fn add(&self, slug: &str, name: &str) -> AdminResponse {
        self.add_with(slug, name, true).await
    }

    /// Add a record with an explicit enabled flag.
    pub async fn add_with(&self, slug: &str, name: &str, enabled: bool) -> AdminResponse {
        let slug = sanitize_key(slug);
        let name = sanitize_text(name);
        if slug.is_empty() || name.is_empty() {
            return AdminResponse::failure("VALIDATION_ERROR", "スラッグと名前は必須です");
        }

        let new = NewRecord {
            slug,
            name,
            enabled,
        };
        match self.store.add(&new).await {
            Ok(_) => AdminResponse::ok("追加しました").with_reload(),
            Err(e) => {
                warn!(family = %self.store.family(), slug = %new.slug, error = %e, "add failed");
                AdminResponse::failure(
                    error_code(&e),
                    "既に存在するスラッグか、追加に失敗しました",
                )
            }
        }
    }

    /// Delete a record.
    pub async fn delete(&self, slug: &str) -> AdminResponse {
        let slug = sanitize_key(slug);
        if slug.is_empty() {
            return AdminResponse::failure("VALIDATION_ERROR", "スラッグが必要です");
        }

        match self.store.delete(&slug).await {
            Ok(()) => AdminResponse::ok("削除しました"),
            Err(e) => {
                warn!(family = %self.store.family(), slug = %slug, error = %e, "delete failed");
                AdminResponse::failure(error_code(&e), "削除に失敗しました")
            }
        }
    }

    /// Toggle a record's enabled flag.
    pub async fn set_enabled(&self, slug: &str, enabled: bool) -> AdminResponse {
        match self.store.set_enabled(&sanitize_key(slug), enabled).await {
            Ok(_) => AdminResponse::ok("保存しました"),
            Err(e) => AdminResponse::failure(error_code(&e), "保存に失敗しました"),
        }
    }

    /// Persist a drag-reorder.
    pub async fn reorder(&self, slugs: &[String]) -> AdminResponse {
        let slugs: Vec<String> = slugs.iter().map(|s| sanitize_key(s)).collect();
        match self.store.reorder(&slugs).await {
            Ok(_) => AdminResponse::ok("並び順を保存しました"),
            Err(e) => AdminResponse::failure(error_code(&e), "並び順の保存に失敗しました"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::RecordFamily;
    use serde_json::json;
    use soico_db::{Database, Transients};
    use soico_links::{LinkDirectory, LinkResolver};
    use std::sync::Arc;

    async fn admin() -> (AdminService, RecordStore) {
        let db = Database::in_memory().await.expect("create db");
        let transients = Transients::memory();
        let links = LinkResolver::new(
            Arc::new(LinkDirectory::new()),
            transients.clone(),
            url::Url::parse("https://example.jp").expect("valid url"),
        );
        let store = RecordStore::new(RecordFamily::Securities, db, transients, links);
        (AdminService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_save_requires_data() {
        let (admin, _) = admin().await;
        let response = admin.save(&json!({})).await;
        assert!(!response.success);
        assert_eq!(response.message, "データが送信されていません");
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let (admin, store) = admin().await;
        let input = json!({ "sbi": { "name": "SBI証券", "enabled": true, "features": "a\nb" } });

        assert!(admin.save(&input).await.success);
        let first = store.load().await.expect("load");
        assert!(admin.save(&input).await.success);
        assert_eq!(store.load().await.expect("load"), first);
    }

    #[tokio::test]
    async fn test_add_then_duplicate() {
        let (admin, _) = admin().await;

        let response = admin.add("NewCo", "New Co").await;
        assert_eq!(response, AdminResponse::ok("追加しました").with_reload());

        let response = admin.add("newco", "Again").await;
        assert!(!response.success);
        assert_eq!(response.code.as_deref(), Some("DUPLICATE_SLUG"));
    }

    #[tokio::test]
    async fn test_add_requires_slug_and_name() {
        let (admin, _) = admin().await;
        let response = admin.add("", "Name").await;
        assert_eq!(response.message, "スラッグと名前は必須です");
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let (admin, _) = admin().await;
        let response = admin.delete("ghost").await;
        assert!(!response.success);
        assert_eq!(response.code.as_deref(), Some("NOT_FOUND"));

        assert_eq!(admin.delete("").await.message, "スラッグが必要です");
    }

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_value(AdminResponse::ok("保存しました")).expect("serialize");
        assert_eq!(json, json!({ "success": true, "message": "保存しました" }));
    }
}
