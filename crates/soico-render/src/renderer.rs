//! Service container for rendering.
//!
//! `CtaRenderer` is built once per process and owns the record stores and
//! settings of both families plus the shared link resolver. Widgets are
//! rendered through it so that lookups, tracking configuration and debug
//! output come from one place.

use crate::{
    blocks::{
        company_or_default, BlockName, ComparisonTableAttrs, ConclusionBoxAttrs, InlineCtaAttrs,
        SingleButtonAttrs, SubtleBannerAttrs, Widget,
    },
    error::{RenderError, Result},
    styles::css_variables,
    text::diagnostic,
    widgets::{self, WidgetContext},
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use soico_core::AppConfig;
use soico_db::{Database, Transients};
use soico_links::{LinkEvent, LinkResolver};
use soico_records::{RecordFamily, RecordStore, ResolvedRecord, SettingsStore};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
struct FamilyServices {
    records: RecordStore,
    settings: SettingsStore,
}

impl FamilyServices {
    fn new(family: RecordFamily, db: &Database, transients: &Transients, links: &LinkResolver) -> Self {
        Self {
            records: RecordStore::new(family, db.clone(), transients.clone(), links.clone()),
            settings: SettingsStore::new(family, db.clone()),
        }
    }
}

/// Renders widgets for both record families.
#[derive(Clone)]
pub struct CtaRenderer {
    securities: FamilyServices,
    card_loans: FamilyServices,
    links: LinkResolver,
    debug: bool,
    today: Option<NaiveDate>,
}

impl CtaRenderer {
    /// Build stores for both families over one database and cache.
    #[must_use]
    pub fn new(db: &Database, transients: &Transients, links: LinkResolver) -> Self {
        Self {
            securities: FamilyServices::new(RecordFamily::Securities, db, transients, &links),
            card_loans: FamilyServices::new(RecordFamily::CardLoan, db, transients, &links),
            links,
            debug: false,
            today: None,
        }
    }

    /// Build from configuration: debug flag and record cache TTL.
    #[must_use]
    pub fn from_config(
        db: &Database,
        transients: &Transients,
        links: LinkResolver,
        config: &AppConfig,
    ) -> Self {
        Self::new(db, transients, links)
            .with_debug(config.general.debug)
            .with_records_ttl(Duration::from_secs(config.cache.records_ttl_secs))
    }

    /// Emit diagnostic comments for widgets that render nothing.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Fix the date used in table footers instead of the local clock.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Override the record cache TTL of both families.
    #[must_use]
    pub fn with_records_ttl(mut self, ttl: Duration) -> Self {
        self.securities.records = self.securities.records.with_ttl(ttl);
        self.card_loans.records = self.card_loans.records.with_ttl(ttl);
        self
    }

    fn family(&self, family: RecordFamily) -> &FamilyServices {
        match family {
            RecordFamily::Securities => &self.securities,
            RecordFamily::CardLoan => &self.card_loans,
        }
    }

    /// Record store of `family`.
    #[must_use]
    pub fn records(&self, family: RecordFamily) -> &RecordStore {
        &self.family(family).records
    }

    /// Settings store of `family`.
    #[must_use]
    pub fn settings(&self, family: RecordFamily) -> &SettingsStore {
        &self.family(family).settings
    }

    /// Shared link resolver.
    #[must_use]
    pub fn links(&self) -> &LinkResolver {
        &self.links
    }

    /// Whether diagnostic comments are emitted.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// React to a link storage notification.
    ///
    /// Record caches embed resolved URLs, so they are cleared together with
    /// the link cache. Returns whether anything was cleared.
    pub async fn handle_link_event(&self, event: &LinkEvent) -> bool {
        if !self.links.handle_event(event).await {
            return false;
        }
        for family in RecordFamily::ALL {
            self.records(family).clear_record_cache().await;
        }
        info!(kind = event.kind(), "record caches cleared after link change");
        true
    }

    /// The `:root` variable blocks for the given families.
    pub async fn stylesheet(&self, families: &[RecordFamily]) -> Result<String> {
        let mut css = String::new();
        for &family in families {
            let design = self.settings(family).design().await?;
            css.push_str(&css_variables(family, &design));
        }
        Ok(css)
    }

    async fn single(
        &self,
        family: RecordFamily,
        widget: Widget,
        company: Option<&str>,
        draw: impl FnOnce(&WidgetContext<'_>, &ResolvedRecord) -> String,
    ) -> Result<String> {
        let slug = company_or_default(company, family);
        let found = self.records(family).get(slug).await?;
        debug!(%family, widget = %widget, slug, found = found.is_some(), "rendering widget");

        let Some(record) = found else {
            return Ok(diagnostic(self.debug, &format!("Record not found: {slug}")));
        };

        let tracking = self.settings(family).tracking().await?;
        let ctx = WidgetContext {
            family,
            tracking: &tracking,
            debug: self.debug,
            today: self.today(),
        };
        Ok(draw(&ctx, &record))
    }

    /// Render a conclusion box.
    pub async fn conclusion_box(
        &self,
        family: RecordFamily,
        attrs: &ConclusionBoxAttrs,
    ) -> Result<String> {
        self.single(family, Widget::ConclusionBox, attrs.company.as_deref(), |ctx, record| {
            widgets::conclusion_box(ctx, record, attrs)
        })
        .await
    }

    /// Render an inline CTA.
    pub async fn inline_cta(&self, family: RecordFamily, attrs: &InlineCtaAttrs) -> Result<String> {
        self.single(family, Widget::InlineCta, attrs.company.as_deref(), |ctx, record| {
            widgets::inline_cta(ctx, record, attrs)
        })
        .await
    }

    /// Render a single button.
    pub async fn single_button(
        &self,
        family: RecordFamily,
        attrs: &SingleButtonAttrs,
    ) -> Result<String> {
        self.single(family, Widget::SingleButton, attrs.company.as_deref(), |ctx, record| {
            widgets::single_button(ctx, record, attrs)
        })
        .await
    }

    /// Render a subtle banner.
    pub async fn subtle_banner(
        &self,
        family: RecordFamily,
        attrs: &SubtleBannerAttrs,
    ) -> Result<String> {
        self.single(family, Widget::SubtleBanner, attrs.company.as_deref(), |ctx, record| {
            widgets::subtle_banner(ctx, record, attrs)
        })
        .await
    }

    /// Render a comparison table of the family's enabled records.
    pub async fn comparison_table(
        &self,
        family: RecordFamily,
        attrs: &ComparisonTableAttrs,
    ) -> Result<String> {
        let records = self.records(family).list_enabled(0).await?;
        debug!(
            %family,
            limit = attrs.limit,
            enabled = records.len(),
            "rendering comparison table"
        );

        let tracking = self.settings(family).tracking().await?;
        let ctx = WidgetContext {
            family,
            tracking: &tracking,
            debug: self.debug,
            today: self.today(),
        };
        Ok(widgets::comparison_table(&ctx, &records, attrs))
    }

    /// Render a block by name from its JSON attribute bag.
    ///
    /// `null` attributes mean all defaults.
    pub async fn render_block(&self, name: &str, attributes: &Value) -> Result<String> {
        let block = BlockName::parse(name).ok_or_else(|| RenderError::UnknownBlock {
            name: name.to_string(),
        })?;
        let family = block.family;

        match block.widget {
            Widget::ConclusionBox => {
                self.conclusion_box(family, &decode(name, attributes)?).await
            }
            Widget::InlineCta => self.inline_cta(family, &decode(name, attributes)?).await,
            Widget::SingleButton => self.single_button(family, &decode(name, attributes)?).await,
            Widget::ComparisonTable => {
                self.comparison_table(family, &decode(name, attributes)?).await
            }
            Widget::SubtleBanner => self.subtle_banner(family, &decode(name, attributes)?).await,
        }
    }
}

fn decode<T: DeserializeOwned + Default>(block: &str, attributes: &Value) -> Result<T> {
    if attributes.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(attributes.clone()).map_err(|e| RenderError::InvalidAttributes {
        block: block.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use soico_core::LinkId;
    use soico_links::{LinkDirectory, LinkEntity, DEFAULT_ENTITY_KIND};
    use soico_records::seed_defaults;
    use std::sync::Arc;

    struct Fixture {
        renderer: CtaRenderer,
        directory: LinkDirectory,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.expect("create db");
        seed_defaults(&db, &Transients::disabled()).await.expect("seed");

        let directory = LinkDirectory::new();
        let transients = Transients::memory();
        let links = LinkResolver::new(
            Arc::new(directory.clone()),
            transients.clone(),
            url::Url::parse("https://media.example.jp").expect("valid url"),
        );
        let renderer = CtaRenderer::new(&db, &transients, links)
            .with_today(NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"));
        Fixture {
            renderer,
            directory,
        }
    }

    fn link(id: u64, slug: &str) -> LinkEntity {
        LinkEntity {
            id: LinkId::from_raw(id).expect("non-zero id"),
            kind: DEFAULT_ENTITY_KIND.to_string(),
            slug: slug.to_string(),
            title: slug.to_string(),
            published: true,
            categories: Vec::new(),
        }
    }

    async fn give_sbi_a_url(renderer: &CtaRenderer) {
        let store = renderer.records(RecordFamily::Securities);
        let mut input = serde_json::Map::new();
        for (slug, record) in store.load().await.expect("load") {
            let mut flat = record.to_input();
            if slug.as_str() == "sbi" {
                flat["direct_url"] = json!("https://sbi.example/");
            }
            input.insert(slug.to_string(), flat);
        }
        store.save(&input).await.expect("save");
    }

    #[tokio::test]
    async fn test_seeded_records_without_urls_render_empty() {
        let fx = fixture().await;
        for block in BlockName::all() {
            let html = fx
                .renderer
                .render_block(&block.to_string(), &Value::Null)
                .await
                .expect("render");
            assert_eq!(html, "", "{block}");
        }
    }

    #[tokio::test]
    async fn test_debug_comments() {
        let fx = fixture().await;
        let renderer = fx.renderer.with_debug(true);

        let html = renderer
            .render_block("soico-cta/single-button", &json!({ "company": "ghost" }))
            .await
            .expect("render");
        assert_eq!(html, "<!-- [SOICO CTA Debug] Record not found: ghost -->");

        let html = renderer
            .render_block("soico-cta/cardloan-comparison-table", &json!({}))
            .await
            .expect("render");
        assert_eq!(
            html,
            "<!-- [SOICO CTA Debug] No enabled records found for comparison_table -->"
        );
    }

    #[tokio::test]
    async fn test_default_company() {
        let fx = fixture().await;
        give_sbi_a_url(&fx.renderer).await;

        let html = fx
            .renderer
            .render_block("soico-cta/conclusion-box", &json!({}))
            .await
            .expect("render");
        assert!(html.contains("SBI証券で口座開設（無料）"));
        assert!(html.contains(r#"href="https://sbi.example/""#));
        assert!(html.contains(r#"data-gtm-action="securities_affiliate""#));
    }

    #[tokio::test]
    async fn test_unknown_block_and_bad_attributes() {
        let fx = fixture().await;

        let err = fx
            .renderer
            .render_block("soico-cta/hero", &Value::Null)
            .await
            .expect_err("unknown");
        assert!(matches!(err, RenderError::UnknownBlock { .. }));

        let err = fx
            .renderer
            .render_block("soico-cta/comparison-table", &json!({ "limit": "many" }))
            .await
            .expect_err("bad limit");
        assert!(matches!(err, RenderError::InvalidAttributes { .. }));
    }

    #[tokio::test]
    async fn test_link_event_refreshes_rendered_url() {
        let fx = fixture().await;
        give_sbi_a_url(&fx.renderer).await;

        let store = fx.renderer.records(RecordFamily::Securities);
        let mut input = serde_json::Map::new();
        for (slug, record) in store.load().await.expect("load") {
            let mut flat = record.to_input();
            if slug.as_str() == "sbi" {
                flat["link_ref"] = json!(12);
            }
            input.insert(slug.to_string(), flat);
        }
        store.save(&input).await.expect("save");

        let before = fx
            .renderer
            .render_block("soico-cta/single-button", &Value::Null)
            .await
            .expect("render");
        assert!(before.contains(r#"href="https://sbi.example/""#));

        fx.directory.insert(link(12, "sbi-open"), None);
        let event = LinkEvent::Saved {
            id: LinkId::from_raw(12).expect("non-zero id"),
            kind: DEFAULT_ENTITY_KIND.to_string(),
        };
        assert!(fx.renderer.handle_link_event(&event).await);

        let after = fx
            .renderer
            .render_block("soico-cta/single-button", &Value::Null)
            .await
            .expect("render");
        assert!(after.contains(r#"href="https://media.example.jp/recommends/sbi-open/""#));
    }

    #[tokio::test]
    async fn test_foreign_link_event_is_ignored() {
        let fx = fixture().await;
        let event = LinkEvent::Deleted {
            id: LinkId::from_raw(1).expect("non-zero id"),
            kind: "post".to_string(),
        };
        assert!(!fx.renderer.handle_link_event(&event).await);
    }

    #[tokio::test]
    async fn test_stylesheet_uses_saved_design() {
        let fx = fixture().await;
        fx.renderer
            .settings(RecordFamily::CardLoan)
            .save_design(&json!({ "primary_color": "#112233", "border_radius": "4" }))
            .await
            .expect("save design");

        let css = fx
            .renderer
            .stylesheet(&RecordFamily::ALL)
            .await
            .expect("stylesheet");
        assert!(css.contains("--soico-cta-primary: #FF6B35;"));
        assert!(css.contains("--soico-cta-cardloan-primary: #112233;"));
        assert!(css.contains("--soico-cta-cardloan-border-radius: 4px;"));
    }
}
