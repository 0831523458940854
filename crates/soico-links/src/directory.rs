//! In-process implementation of [`LinkService`].
//!
//! A `LinkDirectory` holds link entities in memory. It can be filled
//! programmatically or loaded from a TOML file:
//!
//! ```toml
//! active = true
//! prefix = "go"
//!
//! [[link]]
//! id = 101
//! slug = "sbi"
//! title = "SBI証券"
//! destination_url = "https://www.sbisec.co.jp/"
//! categories = ["securities"]
//! ```

use crate::{
    error::{LinkError, Result},
    service::{LinkEntity, LinkQuery, LinkService, DEFAULT_ENTITY_KIND},
};
use async_trait::async_trait;
use serde::Deserialize;
use soico_core::LinkId;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default, rename = "link")]
    links: Vec<DirectoryLink>,
}

#[derive(Debug, Deserialize)]
struct DirectoryLink {
    id: u64,
    slug: String,
    title: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default = "default_active")]
    published: bool,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    destination_url: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone)]
struct StoredLink {
    entity: LinkEntity,
    destination_url: Option<String>,
}

#[derive(Debug)]
struct DirectoryState {
    active: bool,
    prefix: Option<String>,
    links: BTreeMap<LinkId, StoredLink>,
}

/// Link entities held in memory.
#[derive(Debug, Clone)]
pub struct LinkDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl Default for LinkDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkDirectory {
    /// An active, empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DirectoryState {
                active: true,
                prefix: None,
                links: BTreeMap::new(),
            })),
        }
    }

    /// A directory that reports the service as not installed.
    #[must_use]
    pub fn inactive() -> Self {
        let directory = Self::new();
        directory.set_active(false);
        directory
    }

    /// Load a directory from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed, or holds an invalid link.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| LinkError::LoadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let directory = Self::from_toml_str(&contents, &path.display().to_string())?;

        info!(
            path = %path.display(),
            count = directory.len(),
            "loaded link directory"
        );

        Ok(directory)
    }

    /// Parse a directory from TOML text; `origin` names the source in errors.
    ///
    /// # Errors
    /// Returns error on malformed TOML, a zero id or an empty slug.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self> {
        let file: DirectoryFile = toml::from_str(contents).map_err(|e| LinkError::ParseError {
            path: origin.to_string(),
            source: e,
        })?;

        let directory = Self::new();
        directory.set_active(file.active);
        directory.set_prefix(file.prefix);

        for link in file.links {
            let id = LinkId::from_raw(link.id).ok_or_else(|| LinkError::ValidationError {
                id: link.id,
                reason: "id must be non-zero".to_string(),
            })?;

            if link.slug.trim().is_empty() {
                return Err(LinkError::ValidationError {
                    id: link.id,
                    reason: "slug must not be empty".to_string(),
                });
            }

            let entity = LinkEntity {
                id,
                kind: link.kind.unwrap_or_else(|| DEFAULT_ENTITY_KIND.to_string()),
                slug: link.slug,
                title: link.title,
                published: link.published,
                categories: link.categories,
            };
            directory.insert(entity, link.destination_url);
        }

        Ok(directory)
    }

    /// Insert or replace an entity.
    pub fn insert(&self, entity: LinkEntity, destination_url: Option<String>) {
        let mut state = self.state.write().expect("acquire write lock on links");
        debug!(id = %entity.id, slug = %entity.slug, "storing link entity");
        state.links.insert(
            entity.id,
            StoredLink {
                entity,
                destination_url,
            },
        );
    }

    /// Remove an entity, returning it if it existed.
    pub fn remove(&self, id: LinkId) -> Option<LinkEntity> {
        let mut state = self.state.write().expect("acquire write lock on links");
        state.links.remove(&id).map(|stored| stored.entity)
    }

    /// Set or clear the URL prefix.
    pub fn set_prefix(&self, prefix: Option<String>) {
        let mut state = self.state.write().expect("acquire write lock on links");
        state.prefix = prefix;
    }

    /// Mark the service active or inactive.
    pub fn set_active(&self, active: bool) {
        let mut state = self.state.write().expect("acquire write lock on links");
        state.active = active;
    }

    /// Number of entities held, published or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .read()
            .expect("acquire read lock on links")
            .links
            .len()
    }

    /// Whether the directory holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LinkService for LinkDirectory {
    async fn is_active(&self) -> bool {
        self.state.read().expect("acquire read lock on links").active
    }

    async fn entity(&self, id: LinkId) -> Result<Option<LinkEntity>> {
        let state = self.state.read().expect("acquire read lock on links");
        Ok(state.links.get(&id).map(|stored| stored.entity.clone()))
    }

    async fn destination_url(&self, id: LinkId) -> Result<Option<String>> {
        let state = self.state.read().expect("acquire read lock on links");
        Ok(state
            .links
            .get(&id)
            .and_then(|stored| stored.destination_url.clone()))
    }

    async fn link_prefix(&self) -> Result<Option<String>> {
        let state = self.state.read().expect("acquire read lock on links");
        Ok(state.prefix.clone())
    }

    async fn published(&self, query: &LinkQuery) -> Result<Vec<LinkEntity>> {
        let state = self.state.read().expect("acquire read lock on links");

        let mut entities: Vec<LinkEntity> = state
            .links
            .values()
            .map(|stored| &stored.entity)
            .filter(|entity| entity.published && query.matches(entity))
            .cloned()
            .collect();

        entities.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        if let Some(limit) = query.limit {
            entities.truncate(limit);
        }

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
prefix = "go"

[[link]]
id = 2
slug = "rakuten"
title = "楽天証券"
destination_url = "https://www.rakuten-sec.co.jp/"
categories = ["securities"]

[[link]]
id = 1
slug = "monex"
title = "マネックス証券"
destination_url = "https://www.monex.co.jp/"
categories = ["securities"]

[[link]]
id = 3
slug = "draft"
title = "Draft link"
published = false
"#;

    fn id(raw: u64) -> LinkId {
        LinkId::from_raw(raw).expect("non-zero id")
    }

    #[tokio::test]
    async fn test_from_toml_str() {
        let directory = LinkDirectory::from_toml_str(SAMPLE, "sample").expect("parse sample");

        assert_eq!(directory.len(), 3);
        assert!(directory.is_active().await);
        assert_eq!(
            directory.link_prefix().await.expect("prefix"),
            Some("go".to_string())
        );

        let entity = directory.entity(id(2)).await.expect("lookup").expect("exists");
        assert_eq!(entity.kind, DEFAULT_ENTITY_KIND);
        assert_eq!(
            directory.destination_url(id(2)).await.expect("lookup"),
            Some("https://www.rakuten-sec.co.jp/".to_string())
        );
    }

    #[tokio::test]
    async fn test_published_excludes_drafts_and_orders_by_title() {
        let directory = LinkDirectory::from_toml_str(SAMPLE, "sample").expect("parse sample");
        let titles: Vec<String> = directory
            .published(&LinkQuery::all())
            .await
            .expect("list")
            .into_iter()
            .map(|e| e.title)
            .collect();

        assert_eq!(titles, vec!["マネックス証券", "楽天証券"]);
    }

    #[tokio::test]
    async fn test_published_respects_limit() {
        let directory = LinkDirectory::from_toml_str(SAMPLE, "sample").expect("parse sample");
        let query = LinkQuery {
            limit: Some(1),
            ..LinkQuery::default()
        };
        assert_eq!(directory.published(&query).await.expect("list").len(), 1);
    }

    #[test]
    fn test_zero_id_rejected() {
        let result = LinkDirectory::from_toml_str("[[link]]\nid = 0\nslug = \"a\"\ntitle = \"A\"\n", "t");
        assert!(matches!(result, Err(LinkError::ValidationError { id: 0, .. })));
    }

    #[test]
    fn test_malformed_toml() {
        let result = LinkDirectory::from_toml_str("[[link]\n", "broken");
        assert!(matches!(result, Err(LinkError::ParseError { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write sample");

        let directory = LinkDirectory::load(file.path()).expect("load");
        assert_eq!(directory.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = LinkDirectory::load("/nonexistent/links.toml");
        assert!(matches!(result, Err(LinkError::LoadError { .. })));
    }

    #[tokio::test]
    async fn test_inactive_directory() {
        let directory = LinkDirectory::inactive();
        assert!(!directory.is_active().await);
    }

    #[tokio::test]
    async fn test_remove() {
        let directory = LinkDirectory::from_toml_str(SAMPLE, "sample").expect("parse sample");
        assert!(directory.remove(id(1)).is_some());
        assert!(directory.entity(id(1)).await.expect("lookup").is_none());
        assert!(directory.remove(id(1)).is_none());
    }
}
