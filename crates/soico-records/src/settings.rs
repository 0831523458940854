//! Design and tracking settings per family.
//!
//! Stored documents may be partial; reads merge them over the family
//! defaults. Writes sanitize the submitted form first.

use crate::{
    error::{RecordError, Result},
    family::RecordFamily,
    input::{absint, color, text, truthy},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use soico_core::html::escape_html;
use soico_core::HexColor;
use soico_db::{options, Database, WriteOutcome};
use std::fmt::Write as _;
use tracing::{info, warn};

/// Default corner radius in pixels.
pub const DEFAULT_BORDER_RADIUS: u32 = 8;

/// Default GTM event category.
pub const DEFAULT_EVENT_CATEGORY: &str = "CTA Click";

/// Colours and shape of a family's widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSettings {
    /// Primary colour
    pub primary_color: HexColor,
    /// Secondary colour
    pub secondary_color: HexColor,
    /// Corner radius in pixels
    pub border_radius: u32,
}

impl DesignSettings {
    /// Family defaults.
    #[must_use]
    pub fn defaults(family: RecordFamily) -> Self {
        Self {
            primary_color: family_color(family.primary_color()),
            secondary_color: family_color(family.secondary_color()),
            border_radius: DEFAULT_BORDER_RADIUS,
        }
    }

    /// Merge a stored or submitted document over the defaults.
    ///
    /// Missing or invalid fields keep their default.
    #[must_use]
    pub fn from_input(family: RecordFamily, input: &Value) -> Self {
        let defaults = Self::defaults(family);
        let field = |key: &str| input.get(key).filter(|v| !v.is_null());

        Self {
            primary_color: field("primary_color")
                .and_then(color)
                .unwrap_or(defaults.primary_color),
            secondary_color: field("secondary_color")
                .and_then(color)
                .unwrap_or(defaults.secondary_color),
            border_radius: field("border_radius").map_or(defaults.border_radius, |v| {
                u32::try_from(absint(v)).unwrap_or(u32::MAX)
            }),
        }
    }
}

/// Analytics attributes configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingSettings {
    /// Emit `data-gtm-*` attributes at all
    pub gtm_enabled: bool,
    /// Event category
    pub event_category: String,
    /// Event action
    pub event_action: String,
}

impl TrackingSettings {
    /// Family defaults.
    #[must_use]
    pub fn defaults(family: RecordFamily) -> Self {
        Self {
            gtm_enabled: true,
            event_category: DEFAULT_EVENT_CATEGORY.to_string(),
            event_action: family.event_action().to_string(),
        }
    }

    /// Merge a stored document over the defaults.
    #[must_use]
    pub fn merged(family: RecordFamily, stored: &Value) -> Self {
        let defaults = Self::defaults(family);
        let field = |key: &str| stored.get(key).filter(|v| !v.is_null());

        Self {
            gtm_enabled: field("gtm_enabled").map_or(defaults.gtm_enabled, truthy),
            event_category: field("event_category")
                .map(text)
                .unwrap_or(defaults.event_category),
            event_action: field("event_action")
                .map(text)
                .unwrap_or(defaults.event_action),
        }
    }

    /// Sanitize a submitted form; an absent `gtm_enabled` checkbox means off.
    #[must_use]
    pub fn sanitize(family: RecordFamily, input: &Value) -> Self {
        let gtm_enabled = input.get("gtm_enabled").is_some_and(truthy);
        Self {
            gtm_enabled,
            ..Self::merged(family, input)
        }
    }

    /// ` data-gtm-category=".." data-gtm-action=".." data-gtm-label=".." data-cta-type=".."`,
    /// or an empty string when tracking is off.
    #[must_use]
    pub fn attributes(&self, slug: &str, cta_type: &str) -> String {
        if !self.gtm_enabled {
            return String::new();
        }

        let mut out = String::new();
        for (name, value) in [
            ("data-gtm-category", self.event_category.as_str()),
            ("data-gtm-action", self.event_action.as_str()),
            ("data-gtm-label", slug),
            ("data-cta-type", cta_type),
        ] {
            let _ = write!(out, r#" {name}="{}""#, escape_html(value));
        }
        out
    }
}

fn family_color(raw: &'static str) -> HexColor {
    HexColor::parse(raw).expect("family colours are valid hex")
}

/// Reads and writes a family's settings documents.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    family: RecordFamily,
    db: Database,
}

impl SettingsStore {
    /// Create a settings store for `family`.
    #[must_use]
    pub fn new(family: RecordFamily, db: Database) -> Self {
        Self { family, db }
    }

    /// The family this store serves.
    #[must_use]
    pub fn family(&self) -> RecordFamily {
        self.family
    }

    /// Current design settings.
    pub async fn design(&self) -> Result<DesignSettings> {
        let stored = self.read(self.family.design_key()).await?;
        Ok(DesignSettings::from_input(self.family, &stored))
    }

    /// Current tracking settings.
    pub async fn tracking(&self) -> Result<TrackingSettings> {
        let stored = self.read(self.family.tracking_key()).await?;
        Ok(TrackingSettings::merged(self.family, &stored))
    }

    /// Sanitize and store design settings.
    pub async fn save_design(&self, input: &Value) -> Result<WriteOutcome> {
        let design = DesignSettings::from_input(self.family, input);
        self.write(self.family.design_key(), &design).await
    }

    /// Sanitize and store tracking settings.
    pub async fn save_tracking(&self, input: &Value) -> Result<WriteOutcome> {
        let tracking = TrackingSettings::sanitize(self.family, input);
        self.write(self.family.tracking_key(), &tracking).await
    }

    /// Tracking attributes for a widget, per the current settings.
    pub async fn tracking_attributes(&self, slug: &str, cta_type: &str) -> Result<String> {
        Ok(self.tracking().await?.attributes(slug, cta_type))
    }

    async fn read(&self, key: &str) -> Result<Value> {
        match options::get_option(self.db.pool(), key).await? {
            Some(value @ Value::Object(_)) => Ok(value),
            Some(_) => {
                warn!(key, "settings document is not an object, using defaults");
                Ok(Value::Null)
            }
            None => Ok(Value::Null),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, settings: &T) -> Result<WriteOutcome> {
        let value = serde_json::to_value(settings).map_err(|e| RecordError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let outcome = options::set_option(self.db.pool(), key, &value).await?;
        info!(family = %self.family, key, ?outcome, "saved settings");
        Ok(outcome)
    }
}
