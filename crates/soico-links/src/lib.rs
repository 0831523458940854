//! SOICO CTA Links - link-cloaking service integration.
//!
//! Affiliate records may reference an entity in an external link-cloaking
//! service instead of carrying a raw URL. This crate defines the read-only
//! interface to that service and resolves references to outbound URLs.
//!
//! # Modules
//!
//! - [`service`] - the [`LinkService`] trait and entity model
//! - [`directory`] - in-memory service, optionally loaded from TOML
//! - [`resolver`] - URL resolution, link listing cache and storage events
//!
//! # Example
//!
//! ```ignore
//! use soico_links::{LinkDirectory, LinkResolver};
//! use soico_db::Transients;
//! use std::sync::Arc;
//!
//! let directory = LinkDirectory::load("links.toml")?;
//! let resolver = LinkResolver::new(Arc::new(directory), Transients::memory(), site_url);
//! let url = resolver.resolve_affiliate_url(link_ref, Some("https://example.com/")).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod directory;
pub mod error;
pub mod resolver;
pub mod service;

// Re-export commonly used types
pub use directory::LinkDirectory;
pub use error::{LinkError, Result};
pub use resolver::{LinkEvent, LinkInfo, LinkResolver, LINKS_CACHE_KEY};
pub use service::{LinkEntity, LinkQuery, LinkService, DEFAULT_ENTITY_KIND};

use soico_core::LinksConfig;
use std::sync::Arc;
use tracing::info;

/// Build the link service described by `config`.
///
/// A disabled integration yields an inactive directory, so every reference
/// misses and records fall through to their direct URLs.
pub fn open_service(config: &LinksConfig) -> Result<Arc<dyn LinkService>> {
    if !config.enabled {
        info!("link service disabled in configuration");
        return Ok(Arc::new(LinkDirectory::inactive()));
    }

    let directory = match &config.directory_path {
        Some(path) => LinkDirectory::load(path)?,
        None => LinkDirectory::new(),
    };
    Ok(Arc::new(directory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_disabled_config_is_inactive() {
        let config = LinksConfig {
            enabled: false,
            ..LinksConfig::default()
        };
        let service = open_service(&config).expect("open service");
        assert!(!service.is_active().await);
    }

    #[tokio::test]
    async fn test_directory_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[[link]]\nid = 5\nslug = \"acom\"\ntitle = \"アコム\"")
            .expect("write links");

        let config = LinksConfig {
            directory_path: Some(file.path().to_path_buf()),
            ..LinksConfig::default()
        };
        let service = open_service(&config).expect("open service");

        assert!(service.is_active().await);
        assert_eq!(
            service.published(&LinkQuery::all()).await.expect("list").len(),
            1
        );
    }

    #[test]
    fn test_missing_directory_file_is_an_error() {
        let config = LinksConfig {
            directory_path: Some("/nonexistent/links.toml".into()),
            ..LinksConfig::default()
        };
        assert!(open_service(&config).is_err());
    }
}
