//! Command implementations.
//!
//! Each command returns the text to print, so the output can be checked in
//! tests without capturing stdout.

use crate::state::AppState;
use serde_json::{Map, Value};
use soico_core::{AppConfig, CtaError, Result};
use soico_links::LinkInfo;
use soico_records::{seed_defaults, AdminResponse, RecordFamily};
use soico_render::BlockName;
use std::fmt::Write;

/// Options of the `list` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Only enabled records
    pub enabled_only: bool,
    /// Maximum rows; 0 means all
    pub limit: usize,
    /// Bypass the record cache
    pub no_cache: bool,
}

/// Insert default records and settings where absent.
pub async fn seed(state: &AppState) -> Result<String> {
    let seeded = seed_defaults(&state.db, &state.transients).await?;
    if seeded.is_empty() {
        return Ok("Nothing to seed; all documents exist".to_string());
    }
    Ok(format!("Seeded {} document(s): {}", seeded.len(), seeded.join(", ")))
}

/// One line per record in priority order.
pub async fn list(
    state: &AppState,
    family: RecordFamily,
    options: ListOptions,
) -> Result<String> {
    let records = state
        .renderer
        .records(family)
        .list_all(!options.no_cache)
        .await?;
    let limit = if options.limit == 0 {
        usize::MAX
    } else {
        options.limit
    };

    let mut out = String::new();
    for resolved in records
        .iter()
        .filter(|r| !options.enabled_only || r.record.enabled)
        .take(limit)
    {
        let record = &resolved.record;
        let _ = writeln!(
            out,
            "{:>3}  {:<12} {:<8} {}  {}",
            record.priority,
            record.slug.as_str(),
            if record.enabled { "enabled" } else { "disabled" },
            record.name,
            resolved.affiliate_url.as_deref().unwrap_or("(no url)")
        );
    }
    if out.is_empty() {
        out.push_str("No records\n");
    }
    Ok(out)
}

fn respond(response: &AdminResponse) -> Result<String> {
    let json = serde_json::to_string(response)
        .map_err(|e| CtaError::Internal(format!("cannot encode admin response: {e}")))?;
    if !response.success {
        return Err(CtaError::Record(json));
    }
    Ok(json)
}

/// Add a record.
pub async fn add(
    state: &AppState,
    family: RecordFamily,
    slug: &str,
    name: &str,
    enabled: bool,
) -> Result<String> {
    respond(&state.admin(family).add_with(slug, name, enabled).await)
}

/// Delete a record.
pub async fn delete(state: &AppState, family: RecordFamily, slug: &str) -> Result<String> {
    respond(&state.admin(family).delete(slug).await)
}

/// Set a record's enabled flag.
pub async fn toggle(
    state: &AppState,
    family: RecordFamily,
    slug: &str,
    enabled: bool,
) -> Result<String> {
    respond(&state.admin(family).set_enabled(slug, enabled).await)
}

/// Rewrite priorities in the given order.
pub async fn reorder(
    state: &AppState,
    family: RecordFamily,
    slugs: &[String],
) -> Result<String> {
    respond(&state.admin(family).reorder(slugs).await)
}

/// Render one block; `company` and `limit` are merged over `attrs`.
pub async fn render(
    state: &AppState,
    block: &str,
    attrs: Option<&str>,
    company: Option<&str>,
    limit: Option<usize>,
    css: bool,
) -> Result<String> {
    let mut bag = match attrs {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(CtaError::Validation("--attrs must be a JSON object".to_string())),
            Err(e) => return Err(CtaError::Validation(format!("--attrs is not valid JSON: {e}"))),
        },
        None => Map::new(),
    };
    if let Some(company) = company {
        bag.insert("company".to_string(), Value::from(company));
    }
    if let Some(limit) = limit {
        bag.insert("limit".to_string(), Value::from(limit));
    }

    let mut out = String::new();
    if css {
        let family = BlockName::parse(block).map(|b| b.family);
        let families: Vec<RecordFamily> = family.into_iter().collect();
        let styles = state.renderer.stylesheet(&families).await?;
        let _ = writeln!(out, "<style>\n{styles}</style>");
    }
    out.push_str(&state.renderer.render_block(block, &Value::Object(bag)).await?);
    Ok(out)
}

fn link_line(out: &mut String, link: &LinkInfo) {
    let _ = writeln!(
        out,
        "{:>5}  {:<24} {}",
        link.id,
        link.name,
        link.url.as_deref().unwrap_or("(no url)")
    );
}

/// Published links, optionally filtered by title.
pub async fn links(state: &AppState, search: Option<&str>) -> Result<String> {
    let resolver = state.renderer.links();
    if !resolver.is_active().await {
        return Ok("Link service is not active; records use their direct URLs\n".to_string());
    }

    let links = match search {
        Some(text) => resolver.search(text).await,
        None => resolver.all_links(true).await,
    };

    let mut out = String::new();
    for link in &links {
        link_line(&mut out, link);
    }
    if out.is_empty() {
        out.push_str("No links\n");
    }
    Ok(out)
}

/// Environment and data summary.
pub async fn diagnose(state: &AppState) -> Result<String> {
    let config = &state.config;
    let mut out = String::new();

    let _ = writeln!(out, "soico-cta v{}", env!("CARGO_PKG_VERSION"));
    let config_path = AppConfig::config_path()
        .map_or_else(|e| format!("unavailable ({e})"), |p| p.display().to_string());
    let _ = writeln!(out, "config:          {config_path}");
    let _ = writeln!(out, "database:        {}", state.database_path.display());
    let _ = writeln!(out, "schema version:  {}", state.db.get_schema_version().await?);
    let _ = writeln!(out, "site url:        {}", config.general.site_url);
    let _ = writeln!(out, "debug comments:  {}", config.general.debug);
    let _ = writeln!(
        out,
        "cache:           {} ({:?}, records {}s, links {}s)",
        if config.cache.enabled { "on" } else { "off" },
        config.cache.backend,
        config.cache.records_ttl_secs,
        config.cache.links_ttl_secs
    );
    let _ = writeln!(
        out,
        "link service:    {}",
        if state.renderer.links().is_active().await {
            "active"
        } else {
            "inactive"
        }
    );

    for family in RecordFamily::ALL {
        let records = state.renderer.records(family).list_all(false).await?;
        let enabled = records.iter().filter(|r| r.record.enabled).count();
        let usable = records
            .iter()
            .filter(|r| r.record.enabled && r.is_usable())
            .count();
        let _ = writeln!(
            out,
            "{:<16} {} records, {enabled} enabled, {usable} renderable",
            format!("{family}:"),
            records.len()
        );
    }

    let blocks: Vec<String> = BlockName::all().iter().map(ToString::to_string).collect();
    let _ = writeln!(out, "blocks:          {}", blocks.join(", "));
    Ok(out)
}
