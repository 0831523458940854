//! Affiliate URL resolution on top of a [`LinkService`].
//!
//! A record's link reference resolves to the service's cloaked address
//! (`<site>/<prefix>/<slug>/`) when one can be built, otherwise to the
//! entity's raw destination. Every service failure is a miss.

use crate::{
    error::Result,
    service::{LinkEntity, LinkQuery, LinkService, DEFAULT_ENTITY_KIND},
};
use serde::{Deserialize, Serialize};
use soico_core::{AppConfig, LinkId, SelectOption};
use soico_db::Transients;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Transient key holding every published link.
pub const LINKS_CACHE_KEY: &str = "soico_cta_links_cache";

/// Prefix used when the service has none configured.
pub const DEFAULT_LINK_PREFIX: &str = "recommends";

/// Result cap for [`LinkResolver::search`].
pub const SEARCH_LIMIT: usize = 20;

/// Label of the empty leading dropdown entry.
pub const SELECT_PLACEHOLDER: &str = "-- 選択してください --";

const DEFAULT_LINKS_TTL: Duration = Duration::from_secs(3600);

/// Resolved view of one link entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Entity id
    pub id: LinkId,
    /// Entity title
    pub name: String,
    /// Entity slug
    pub slug: String,
    /// Raw destination, if stored
    pub destination_url: Option<String>,
    /// Cloaked address, if constructible
    pub cloaked_url: Option<String>,
    /// Effective URL: cloaked, else destination
    pub url: Option<String>,
}

/// Storage-change notification from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// An entity was created or updated
    Saved {
        /// Entity id
        id: LinkId,
        /// Entity kind
        kind: String,
    },
    /// An entity was deleted
    Deleted {
        /// Entity id
        id: LinkId,
        /// Entity kind
        kind: String,
    },
}

impl LinkEvent {
    /// Kind of the entity the event concerns.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Saved { kind, .. } | Self::Deleted { kind, .. } => kind,
        }
    }
}

/// Resolves link references to outbound URLs and caches the link listing.
#[derive(Clone)]
pub struct LinkResolver {
    service: Arc<dyn LinkService>,
    transients: Transients,
    site_url: Url,
    entity_kind: String,
    fallback_prefix: String,
    ttl: Duration,
}

impl LinkResolver {
    /// Create a resolver with default kind, prefix and TTL.
    #[must_use]
    pub fn new(service: Arc<dyn LinkService>, transients: Transients, site_url: Url) -> Self {
        Self {
            service,
            transients,
            site_url,
            entity_kind: DEFAULT_ENTITY_KIND.to_string(),
            fallback_prefix: DEFAULT_LINK_PREFIX.to_string(),
            ttl: DEFAULT_LINKS_TTL,
        }
    }

    /// Create a resolver from application configuration.
    ///
    /// # Errors
    /// Returns error if `general.site_url` is not a valid URL.
    pub fn from_config(
        service: Arc<dyn LinkService>,
        transients: Transients,
        config: &AppConfig,
    ) -> Result<Self> {
        let site_url = config.general.site_url()?;
        Ok(Self::new(service, transients, site_url)
            .with_entity_kind(config.links.entity_kind.clone())
            .with_fallback_prefix(config.links.fallback_prefix.clone())
            .with_ttl(Duration::from_secs(config.cache.links_ttl_secs)))
    }

    /// Override the entity kind that resolves.
    #[must_use]
    pub fn with_entity_kind(mut self, kind: impl Into<String>) -> Self {
        self.entity_kind = kind.into();
        self
    }

    /// Override the prefix used when the service has none.
    #[must_use]
    pub fn with_fallback_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fallback_prefix = prefix.into();
        self
    }

    /// Override the links cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Whether the underlying service is active.
    pub async fn is_active(&self) -> bool {
        self.service.is_active().await
    }

    /// Resolve a link reference to its effective URL.
    ///
    /// Consults the cached link listing first, then looks the entity up
    /// directly. `None` when the reference is empty, the service is inactive,
    /// the entity is missing or of the wrong kind, or no URL can be built.
    pub async fn resolve_url(&self, link_ref: Option<LinkId>) -> Option<String> {
        let id = link_ref?;

        if !self.service.is_active().await {
            debug!(link_id = %id, "link service inactive, skipping resolution");
            return None;
        }

        if let Some(cached) = self.transients.fetch::<Vec<LinkInfo>>(LINKS_CACHE_KEY).await {
            if let Some(info) = cached.into_iter().find(|info| info.id == id) {
                return info.url;
            }
        }

        self.lookup(id).await.and_then(|info| info.url)
    }

    /// Effective affiliate URL of a record: the resolved link, else the direct URL.
    pub async fn resolve_affiliate_url(
        &self,
        link_ref: Option<LinkId>,
        direct_url: Option<&str>,
    ) -> Option<String> {
        if let Some(url) = self.resolve_url(link_ref).await {
            return Some(url);
        }

        direct_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(ToString::to_string)
    }

    /// Full information about one link.
    pub async fn link_info(&self, id: LinkId) -> Option<LinkInfo> {
        if !self.service.is_active().await {
            return None;
        }
        self.lookup(id).await
    }

    /// Every published link ordered by title; refreshes the links cache.
    pub async fn all_links(&self, use_cache: bool) -> Vec<LinkInfo> {
        if !self.service.is_active().await {
            return Vec::new();
        }

        if use_cache {
            if let Some(cached) = self.transients.fetch(LINKS_CACHE_KEY).await {
                return cached;
            }
        }

        let links = self.query(&LinkQuery::all()).await;
        self.transients.put(LINKS_CACHE_KEY, &links, self.ttl).await;
        debug!(count = links.len(), "cached link listing");
        links
    }

    /// Title search, capped at [`SEARCH_LIMIT`]. Empty text lists everything.
    pub async fn search(&self, text: &str) -> Vec<LinkInfo> {
        let text = text.trim();
        if text.is_empty() {
            return self.all_links(true).await;
        }

        if !self.service.is_active().await {
            return Vec::new();
        }
        self.query(&LinkQuery::search(text, SEARCH_LIMIT)).await
    }

    /// Published links in one category, ordered by title.
    pub async fn by_category(&self, category: &str) -> Vec<LinkInfo> {
        if !self.service.is_active().await {
            return Vec::new();
        }
        self.query(&LinkQuery::category(category)).await
    }

    /// Dropdown entries: a placeholder followed by every published link.
    pub async fn select_options(&self) -> Vec<SelectOption> {
        std::iter::once(SelectOption::new("", SELECT_PLACEHOLDER))
            .chain(
                self.all_links(true)
                    .await
                    .into_iter()
                    .map(|link| SelectOption::new(link.id.to_string(), link.name)),
            )
            .collect()
    }

    /// Drop the cached link listing.
    pub async fn clear_cache(&self) {
        self.transients.forget(LINKS_CACHE_KEY).await;
        info!("cleared link cache");
    }

    /// React to a storage notification. Returns whether the cache was cleared.
    pub async fn handle_event(&self, event: &LinkEvent) -> bool {
        if event.kind() != self.entity_kind {
            return false;
        }
        self.clear_cache().await;
        true
    }

    async fn lookup(&self, id: LinkId) -> Option<LinkInfo> {
        let entity = match self.service.entity(id).await {
            Ok(Some(entity)) => entity,
            Ok(None) => {
                debug!(link_id = %id, "link entity not found");
                return None;
            }
            Err(e) => {
                warn!(link_id = %id, error = %e, "link lookup failed");
                return None;
            }
        };

        if entity.kind != self.entity_kind {
            debug!(link_id = %id, kind = %entity.kind, "entity is not a link");
            return None;
        }

        let prefix = self.link_prefix().await;
        Some(self.describe(entity, &prefix).await)
    }

    async fn query(&self, query: &LinkQuery) -> Vec<LinkInfo> {
        let entities = match self.service.published(query).await {
            Ok(entities) => entities,
            Err(e) => {
                warn!(error = %e, "link listing failed");
                return Vec::new();
            }
        };

        let prefix = self.link_prefix().await;
        let mut links = Vec::with_capacity(entities.len());
        for entity in entities
            .into_iter()
            .filter(|entity| entity.kind == self.entity_kind)
        {
            links.push(self.describe(entity, &prefix).await);
        }
        links
    }

    async fn describe(&self, entity: LinkEntity, prefix: &str) -> LinkInfo {
        let destination_url = match self.service.destination_url(entity.id).await {
            Ok(url) => url.filter(|url| !url.trim().is_empty()),
            Err(e) => {
                warn!(link_id = %entity.id, error = %e, "destination lookup failed");
                None
            }
        };

        let cloaked_url = self.cloaked_url(prefix, &entity.slug);
        let url = cloaked_url.clone().or_else(|| destination_url.clone());

        LinkInfo {
            id: entity.id,
            name: entity.title,
            slug: entity.slug,
            destination_url,
            cloaked_url,
            url,
        }
    }

    async fn link_prefix(&self) -> String {
        match self.service.link_prefix().await {
            Ok(Some(prefix)) if !prefix.trim_matches('/').trim().is_empty() => {
                prefix.trim_matches('/').trim().to_string()
            }
            Ok(_) => self.fallback_prefix.clone(),
            Err(e) => {
                warn!(error = %e, "could not read link prefix, using fallback");
                self.fallback_prefix.clone()
            }
        }
    }

    fn cloaked_url(&self, prefix: &str, slug: &str) -> Option<String> {
        let slug = slug.trim().trim_matches('/');
        if slug.is_empty() || prefix.is_empty() {
            return None;
        }

        let base = self.site_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{prefix}/{slug}/"))
            .ok()
            .map(String::from)
    }
}
