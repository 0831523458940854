//! Interface to the external link-cloaking service.
//!
//! The service owns "link" entities (a numeric id, a slug, a title, a
//! destination URL and a publication state) and a configurable URL prefix.
//! Everything in this crate talks to it through [`LinkService`], so the
//! resolver can run against a real integration or a [`crate::LinkDirectory`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use soico_core::LinkId;

/// Entity kind used by the cloaking service for its links.
pub const DEFAULT_ENTITY_KIND: &str = "thirstylink";

/// A link entity as stored by the cloaking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntity {
    /// Service-assigned id
    pub id: LinkId,

    /// Entity kind; only `thirstylink` entities resolve
    #[serde(default = "default_kind")]
    pub kind: String,

    /// URL slug used in the cloaked address
    pub slug: String,

    /// Human-readable title
    pub title: String,

    /// Whether the entity is published
    #[serde(default = "default_published")]
    pub published: bool,

    /// Category slugs
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_kind() -> String {
    DEFAULT_ENTITY_KIND.to_string()
}

fn default_published() -> bool {
    true
}

/// Filter for [`LinkService::published`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkQuery {
    /// Case-insensitive substring match on the title
    pub search: Option<String>,
    /// Restrict to one category slug
    pub category: Option<String>,
    /// Maximum number of entities; `None` for all
    pub limit: Option<usize>,
}

impl LinkQuery {
    /// Every published link.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Title search with a result cap.
    #[must_use]
    pub fn search(text: impl Into<String>, limit: usize) -> Self {
        Self {
            search: Some(text.into()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Published links in one category.
    #[must_use]
    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            category: Some(slug.into()),
            ..Self::default()
        }
    }

    /// Whether `entity` passes the search and category filters.
    #[must_use]
    pub fn matches(&self, entity: &LinkEntity) -> bool {
        let search_ok = self.search.as_deref().map_or(true, |needle| {
            entity
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |cat| entity.categories.iter().any(|c| c == cat));
        search_ok && category_ok
    }
}

/// Operations the cloaking service exposes.
#[async_trait]
pub trait LinkService: Send + Sync {
    /// Whether the service is installed and active.
    async fn is_active(&self) -> bool;

    /// Look up an entity by id, whatever its kind or state.
    async fn entity(&self, id: LinkId) -> Result<Option<LinkEntity>>;

    /// The stored destination URL of an entity, if any.
    async fn destination_url(&self, id: LinkId) -> Result<Option<String>>;

    /// The configured URL prefix; `None` when the service has none set.
    async fn link_prefix(&self) -> Result<Option<String>>;

    /// Published entities matching `query`, ordered by title ascending.
    async fn published(&self, query: &LinkQuery) -> Result<Vec<LinkEntity>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(title: &str, categories: &[&str]) -> LinkEntity {
        LinkEntity {
            id: LinkId::from_raw(1).expect("non-zero id"),
            kind: DEFAULT_ENTITY_KIND.to_string(),
            slug: "x".to_string(),
            title: title.to_string(),
            published: true,
            categories: categories.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_query_all_matches_everything() {
        assert!(LinkQuery::all().matches(&entity("SBI証券", &[])));
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let query = LinkQuery::search("sbi", 20);
        assert!(query.matches(&entity("SBI証券 口座開設", &[])));
        assert!(!query.matches(&entity("楽天証券", &[])));
    }

    #[test]
    fn test_query_category() {
        let query = LinkQuery::category("securities");
        assert!(query.matches(&entity("A", &["securities", "nisa"])));
        assert!(!query.matches(&entity("B", &["cardloan"])));
    }
}
