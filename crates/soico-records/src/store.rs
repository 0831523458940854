//! Persistent record collection for one family.
//!
//! The whole collection is one JSON document in the option store. Reads
//! resolve every record's affiliate URL and sort by priority; the resolved
//! list is cached as a transient. Every successful write clears that cache
//! and the link listing cache.

use crate::{
    error::{RecordError, Result},
    family::RecordFamily,
    record::{sanitize_collection, BrokerRecord, NewRecord, ResolvedRecord},
};
use serde_json::{Map, Value};
use soico_core::{sanitize, SelectOption, Slug};
use soico_db::{options, Database, Transients, WriteOutcome};
use soico_links::LinkResolver;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

type Collection = BTreeMap<Slug, BrokerRecord>;

const DEFAULT_RECORDS_TTL: Duration = Duration::from_secs(3600);

/// CRUD and sorted reads over one family's records.
#[derive(Clone)]
pub struct RecordStore {
    family: RecordFamily,
    db: Database,
    transients: Transients,
    links: LinkResolver,
    ttl: Duration,
}

impl RecordStore {
    /// Create a store for `family`.
    #[must_use]
    pub fn new(
        family: RecordFamily,
        db: Database,
        transients: Transients,
        links: LinkResolver,
    ) -> Self {
        Self {
            family,
            db,
            transients,
            links,
            ttl: DEFAULT_RECORDS_TTL,
        }
    }

    /// Override the record cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The family this store serves.
    #[must_use]
    pub fn family(&self) -> RecordFamily {
        self.family
    }

    /// The resolver used for affiliate URLs.
    #[must_use]
    pub fn links(&self) -> &LinkResolver {
        &self.links
    }

    /// Every record with its affiliate URL, ascending by priority.
    ///
    /// Ties keep slug order. With `use_cache` a warm cache is served as is;
    /// the freshly built list is always written back.
    pub async fn list_all(&self, use_cache: bool) -> Result<Vec<ResolvedRecord>> {
        let key = self.family.cache_key();

        if use_cache {
            if let Some(cached) = self.transients.fetch::<Vec<ResolvedRecord>>(key).await {
                debug!(family = %self.family, count = cached.len(), "serving cached records");
                return Ok(cached);
            }
        }

        let stored = self.load().await?;
        let mut resolved = Vec::with_capacity(stored.len());
        for record in stored.into_values() {
            let affiliate_url = self
                .links
                .resolve_affiliate_url(record.link_ref, record.direct_url.as_deref())
                .await;
            debug!(
                family = %self.family,
                slug = %record.slug,
                resolved = affiliate_url.is_some(),
                "resolved affiliate url"
            );
            resolved.push(ResolvedRecord {
                record,
                affiliate_url,
            });
        }

        resolved.sort_by_key(|r| r.record.priority);

        self.transients.put(key, &resolved, self.ttl).await;
        Ok(resolved)
    }

    /// Enabled records in priority order, at most `limit` (0 = unlimited).
    pub async fn list_enabled(&self, limit: usize) -> Result<Vec<ResolvedRecord>> {
        let enabled = self
            .list_all(true)
            .await?
            .into_iter()
            .filter(|r| r.record.enabled);

        Ok(if limit > 0 {
            enabled.take(limit).collect()
        } else {
            enabled.collect()
        })
    }

    /// One record by slug, enabled or not.
    pub async fn get(&self, slug: &str) -> Result<Option<ResolvedRecord>> {
        Ok(self
            .list_all(true)
            .await?
            .into_iter()
            .find(|r| r.record.slug.as_str() == slug))
    }

    /// The first enabled record.
    pub async fn top(&self) -> Result<Option<ResolvedRecord>> {
        Ok(self.list_enabled(1).await?.into_iter().next())
    }

    /// Enabled records as dropdown entries.
    pub async fn select_options(&self) -> Result<Vec<SelectOption>> {
        Ok(self
            .list_enabled(0)
            .await?
            .into_iter()
            .map(|r| SelectOption::new(r.record.slug.as_str(), r.record.name))
            .collect())
    }

    /// Replace the whole collection with the sanitized `input`.
    ///
    /// Writing a collection identical to the stored one is not an error; the
    /// outcome reports it as [`WriteOutcome::Unchanged`].
    pub async fn save(&self, input: &Map<String, Value>) -> Result<WriteOutcome> {
        let sanitized = sanitize_collection(self.family, input);
        debug!(
            family = %self.family,
            submitted = input.len(),
            kept = sanitized.len(),
            "sanitized submitted records"
        );
        self.persist(&sanitized).await
    }

    /// Add a record at the end of the order.
    ///
    /// Fails on an empty slug or name and on an existing slug.
    pub async fn add(&self, new: &NewRecord) -> Result<BrokerRecord> {
        let slug = Slug::sanitize(&new.slug).ok_or(RecordError::EmptyField { field: "slug" })?;
        let name = sanitize::sanitize_text(&new.name);
        if name.is_empty() {
            return Err(RecordError::EmptyField { field: "name" });
        }

        let mut stored = self.load().await?;
        if stored.contains_key(&slug) {
            return Err(RecordError::DuplicateSlug {
                slug: slug.to_string(),
            });
        }

        let max_priority = stored.values().map(|r| r.priority).max().unwrap_or(0);

        let mut record = BrokerRecord::new(self.family, slug.clone(), name);
        record.priority = max_priority.saturating_add(1);
        record.enabled = new.enabled;

        stored.insert(slug.clone(), record.clone());
        self.persist(&stored).await?;

        info!(family = %self.family, slug = %slug, priority = record.priority, "added record");
        Ok(record)
    }

    /// Remove a record.
    pub async fn delete(&self, slug: &str) -> Result<()> {
        let mut stored = self.load().await?;
        let key = Self::existing_key(&stored, slug)?;

        stored.remove(&key);
        self.persist(&stored).await?;

        info!(family = %self.family, slug = %key, "deleted record");
        Ok(())
    }

    /// Toggle one record's enabled flag.
    pub async fn set_enabled(&self, slug: &str, enabled: bool) -> Result<WriteOutcome> {
        let mut stored = self.load().await?;
        let key = Self::existing_key(&stored, slug)?;

        if let Some(record) = stored.get_mut(&key) {
            record.enabled = enabled;
        }
        self.persist(&stored).await
    }

    /// Assign priorities 1..n in the given order.
    ///
    /// Records not named keep their relative order after the named ones.
    pub async fn reorder(&self, slugs: &[String]) -> Result<WriteOutcome> {
        let mut stored = self.load().await?;

        let mut seen = HashSet::new();
        let mut order = Vec::with_capacity(stored.len());
        for slug in slugs {
            let key = Self::existing_key(&stored, slug).map_err(|_| RecordError::InvalidOrder {
                reason: format!("unknown slug '{slug}'"),
            })?;
            if !seen.insert(key.clone()) {
                return Err(RecordError::InvalidOrder {
                    reason: format!("slug '{slug}' listed twice"),
                });
            }
            order.push(key);
        }

        let mut rest: Vec<&BrokerRecord> = stored
            .values()
            .filter(|r| !seen.contains(&r.slug))
            .collect();
        rest.sort_by_key(|r| r.priority);
        order.extend(rest.into_iter().map(|r| r.slug.clone()));

        for (position, key) in order.iter().enumerate() {
            if let Some(record) = stored.get_mut(key) {
                record.priority = u32::try_from(position + 1).unwrap_or(u32::MAX);
            }
        }

        self.persist(&stored).await
    }

    /// Clear this family's record cache and the link listing cache.
    pub async fn clear_cache(&self) {
        self.clear_record_cache().await;
        self.links.clear_cache().await;
    }

    /// Clear only this family's record cache.
    pub async fn clear_record_cache(&self) {
        self.transients.forget(self.family.cache_key()).await;
        debug!(family = %self.family, "cleared record cache");
    }

    /// Raw stored collection, without URL resolution.
    pub async fn load(&self) -> Result<BTreeMap<Slug, BrokerRecord>> {
        let key = self.family.data_key();
        let Some(value) = options::get_option(self.db.pool(), key).await? else {
            return Ok(Collection::new());
        };

        serde_json::from_value(value).map_err(|e| RecordError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    async fn persist(&self, records: &Collection) -> Result<WriteOutcome> {
        let key = self.family.data_key();
        let value = serde_json::to_value(records).map_err(|e| RecordError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let outcome = options::set_option(self.db.pool(), key, &value).await?;
        if outcome == WriteOutcome::Unchanged {
            debug!(family = %self.family, "records unchanged, treating as success");
        }

        self.clear_cache().await;
        info!(family = %self.family, count = records.len(), ?outcome, "saved records");
        Ok(outcome)
    }

    fn existing_key(stored: &Collection, slug: &str) -> Result<Slug> {
        Slug::new(slug)
            .ok()
            .filter(|key| stored.contains_key(key))
            .ok_or_else(|| RecordError::NotFound {
                slug: slug.to_string(),
            })
    }
}
