//! Configuration management for the CTA widgets.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Main application configuration.
///
/// This is loaded from `~/.config/soico-cta/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Option store location
    pub database: DatabaseConfig,
    /// Transient cache behaviour
    pub cache: CacheConfig,
    /// Link-cloaking service integration
    pub links: LinksConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SOICO_CTA_SITE_URL`: Override the site base URL
    /// - `SOICO_CTA_DEBUG`: Override debug mode (true/false)
    /// - `SOICO_CTA_CACHE_ENABLED`: Override the transient cache (true/false)
    /// - `SOICO_CTA_DATABASE_PATH`: Override the option store path
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SOICO_CTA_SITE_URL") {
            tracing::debug!("Override general.site_url from env: {}", val);
            self.general.site_url = val;
        }

        if let Some(val) = lookup("SOICO_CTA_DEBUG") {
            if let Ok(flag) = val.parse::<bool>() {
                self.general.debug = flag;
                tracing::debug!(debug = flag, "override general.debug from env");
            }
        }

        if let Some(val) = lookup("SOICO_CTA_CACHE_ENABLED") {
            if let Ok(flag) = val.parse::<bool>() {
                self.cache.enabled = flag;
                tracing::debug!(enabled = flag, "override cache.enabled from env");
            }
        }

        if let Some(val) = lookup("SOICO_CTA_DATABASE_PATH") {
            tracing::debug!("Override database.path from env: {}", val);
            self.database.path = Some(PathBuf::from(val));
        }
    }

    /// Check values that serde cannot check on its own.
    pub fn validate(&self) -> ConfigResult<()> {
        self.general.site_url()?;

        if self.links.entity_kind.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "links.entity_kind".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to the default path.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/soico-cta/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("jp", "soico", "soico-cta").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/soico-cta`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("jp", "soico", "soico-cta").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the option store path: the configured one, else `<data dir>/soico-cta.db`.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("soico-cta.db")),
        }
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Public base URL of the site; cloaked links are built under it
    pub site_url: String,
    /// Emit diagnostic HTML comments when a widget cannot render
    pub debug: bool,
}

impl GeneralConfig {
    /// Parse `site_url` as an absolute URL.
    pub fn site_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.site_url).map_err(|e| ConfigError::InvalidValue {
            field: "general.site_url".to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost".to_string(),
            debug: false,
        }
    }
}

/// Option store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; `None` means `<data dir>/soico-cta.db`
    pub path: Option<PathBuf>,
}

/// Where transients live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Process-local cache
    Memory,
    /// `transients` table in the option store
    Database,
}

/// Transient cache behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to bypass every transient (results must not change)
    pub enabled: bool,
    /// Storage backend
    pub backend: CacheBackend,
    /// Lifetime of the resolved record list, per family
    pub records_ttl_secs: u64,
    /// Lifetime of the link listing
    pub links_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::Memory,
            records_ttl_secs: 3600,
            links_ttl_secs: 3600,
        }
    }
}

/// Link-cloaking service integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Whether the link service is installed
    pub enabled: bool,
    /// TOML file listing the link entities
    pub directory_path: Option<PathBuf>,
    /// Entity kind the service stores its links under
    pub entity_kind: String,
    /// URL prefix used when the service has none configured
    pub fallback_prefix: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory_path: None,
            entity_kind: "thirstylink".to_string(),
            fallback_prefix: "recommends".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.general.site_url, "http://localhost");
        assert!(!config.general.debug);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.records_ttl_secs, 3600);
        assert_eq!(config.links.fallback_prefix, "recommends");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[cache]"));
        assert!(toml_str.contains("[links]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.general.site_url, config.general.site_url);
    }

    #[test]
    fn test_config_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.general.site_url = "https://www.soico.jp".to_string();
        config.cache.backend = CacheBackend::Database;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.general.site_url, "https://www.soico.jp");
        assert_eq!(loaded.cache.backend, CacheBackend::Database);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded = AppConfig::load_from(&tmp.path().join("absent.toml")).expect("load config");
        assert!(loaded.cache.enabled);
    }

    #[test]
    fn test_invalid_site_url_rejected() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[general]\nsite_url = \"not a url\"\n").expect("write config");

        let result = AppConfig::load_from(&config_path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SOICO_CTA_SITE_URL", "https://example.jp"),
            ("SOICO_CTA_DEBUG", "true"),
            ("SOICO_CTA_CACHE_ENABLED", "false"),
            ("SOICO_CTA_DATABASE_PATH", "/tmp/cta.db"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.general.site_url, "https://example.jp");
        assert!(config.general.debug);
        assert!(!config.cache.enabled);
        assert_eq!(
            config.database_path().expect("database path"),
            PathBuf::from("/tmp/cta.db")
        );
    }

    #[test]
    fn test_debug_override_alone() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| (key == "SOICO_CTA_DEBUG").then(|| "true".to_string()));
        assert!(config.general.debug);
        assert!(config.cache.enabled);

        config.apply_env_overrides(|key| (key == "SOICO_CTA_DEBUG").then(|| "false".to_string()));
        assert!(!config.general.debug);
    }

    #[test]
    fn test_unparseable_bool_override_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| (key == "SOICO_CTA_DEBUG").then(|| "yes".to_string()));
        assert!(!config.general.debug);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[general]
debug = true

[cache]
backend = "database"
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert!(config.general.debug);
        assert_eq!(config.cache.backend, CacheBackend::Database);
        // These should be defaults
        assert_eq!(config.general.site_url, "http://localhost");
        assert_eq!(config.cache.links_ttl_secs, 3600);
        assert_eq!(config.links.entity_kind, "thirstylink");
    }
}
