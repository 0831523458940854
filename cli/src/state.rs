//! Application state shared by every command.

use soico_core::{AppConfig, Result};
use soico_db::{Database, Transients};
use soico_links::{open_service, LinkResolver};
use soico_records::{AdminService, RecordFamily};
use soico_render::CtaRenderer;
use std::path::PathBuf;
use tracing::info;

/// Services built once per process from the loaded configuration.
pub struct AppState {
    /// Effective configuration
    pub config: AppConfig,
    /// Option store
    pub db: Database,
    /// Transient cache
    pub transients: Transients,
    /// Stores, settings and link resolver for both families
    pub renderer: CtaRenderer,
    /// Where the option store lives
    pub database_path: PathBuf,
}

impl AppState {
    /// Open the configured option store and build the services over it.
    pub async fn open(config: AppConfig) -> Result<Self> {
        let database_path = config.database_path()?;
        let db = Database::open(&database_path).await?;

        info!(path = %database_path.display(), "option store ready");
        Self::with_database(config, db, database_path)
    }

    /// Build the services over an already opened database.
    pub fn with_database(
        config: AppConfig,
        db: Database,
        database_path: PathBuf,
    ) -> Result<Self> {
        let transients = db.transients(&config.cache);
        let service = open_service(&config.links)?;
        let links = LinkResolver::from_config(service, transients.clone(), &config)?;
        let renderer = CtaRenderer::from_config(&db, &transients, links, &config);

        Ok(Self {
            config,
            db,
            transients,
            renderer,
            database_path,
        })
    }

    /// Admin operations for one family.
    pub fn admin(&self, family: RecordFamily) -> AdminService {
        AdminService::new(self.renderer.records(family).clone())
    }
}
