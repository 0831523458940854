//! SOICO CTA Core - Foundation crate for the affiliate CTA widgets.
//!
//! This crate provides shared types, error handling, configuration management
//! and input sanitizers that all other CTA crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Validated newtypes (`Slug`, `HexColor`, `LinkId`)
//! - [`sanitize`] - Text, key and URL sanitizers for admin input
//! - [`html`] - Escaping for rendered markup
//!
//! # Example
//!
//! ```rust
//! use soico_core::{AppConfig, Slug};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert!(config.cache.enabled);
//!
//! let slug = Slug::sanitize("Rakuten").expect("non-empty slug");
//! assert_eq!(slug.as_str(), "rakuten");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod html;
pub mod sanitize;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, CacheBackend, CacheConfig, DatabaseConfig, GeneralConfig, LinksConfig};
pub use error::{ConfigError, ConfigResult, CtaError, Result};
pub use types::{HexColor, LinkId, SelectOption, Slug};
