//! Shared types used across the CTA crates.
//!
//! Newtypes here carry their validation, so a `Slug` or `HexColor` in hand
//! is always well-formed.

use crate::error::CtaError;
use crate::sanitize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Record key: lowercase alphanumerics, `-` and `_`.
///
/// Slugs are immutable once a record exists; they key the stored mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Create a new `Slug`, rejecting anything `sanitize` would alter.
    ///
    /// # Errors
    /// Returns error if the slug is empty or contains disallowed characters.
    pub fn new(slug: impl Into<String>) -> Result<Self, CtaError> {
        let slug = slug.into();
        Self::validate(&slug)?;
        Ok(Self(slug))
    }

    /// Lower-case and strip disallowed characters; `None` if nothing is left.
    #[must_use]
    pub fn sanitize(raw: &str) -> Option<Self> {
        let cleaned = sanitize::sanitize_key(raw);
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(slug: &str) -> Result<(), CtaError> {
        static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SLUG_REGEX.get_or_init(|| Regex::new(r"^[a-z0-9_-]+$").expect("valid regex"));

        if slug.is_empty() {
            return Err(CtaError::Validation("slug must not be empty".to_string()));
        }

        if regex.is_match(slug) {
            Ok(())
        } else {
            Err(CtaError::Validation(format!(
                "invalid slug: must be lowercase alphanumeric with '-' or '_', got '{slug}'"
            )))
        }
    }
}

impl TryFrom<String> for Slug {
    type Error = CtaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CSS hex colour, `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse a hex colour.
    ///
    /// # Errors
    /// Returns error if the value is not `#` followed by 3 or 6 hex digits.
    pub fn new(color: impl Into<String>) -> Result<Self, CtaError> {
        let color = color.into();
        Self::parse(&color)
            .ok_or_else(|| CtaError::Validation(format!("invalid hex colour: '{color}'")))
    }

    /// Lenient parse used by sanitizers: trims, returns `None` when invalid.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        static HEX_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = HEX_REGEX.get_or_init(|| {
            Regex::new(r"^#([A-Fa-f0-9]{3}){1,2}$").expect("valid regex")
        });

        let trimmed = raw.trim();
        regex.is_match(trimmed).then(|| Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = CtaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an entity in the external link-cloaking service.
///
/// Zero is not a valid id; `from_raw(0)` yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(u64);

impl LinkId {
    /// Wrap a raw id; zero means "no link".
    #[must_use]
    pub fn from_raw(id: u64) -> Option<Self> {
        (id != 0).then_some(Self(id))
    }

    /// Get the raw id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A value/label pair for editor and admin dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Submitted value
    pub value: String,
    /// Human-readable label
    pub label: String,
}

impl SelectOption {
    /// Create an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_valid() {
        assert!(Slug::new("sbi").is_ok());
        assert!(Slug::new("new_co-2").is_ok());
    }

    #[test]
    fn test_slug_invalid() {
        assert!(Slug::new("").is_err());
        assert!(Slug::new("SBI").is_err());
        assert!(Slug::new("has space").is_err());
    }

    #[test]
    fn test_slug_sanitize() {
        assert_eq!(
            Slug::sanitize("  Rakuten Sec!").map(|s| s.to_string()),
            Some("rakutensec".to_string())
        );
        assert!(Slug::sanitize("!!!").is_none());
    }

    #[test]
    fn test_slug_serde_validates() {
        let slug: Slug = serde_json::from_str("\"monex\"").expect("deserialize slug");
        assert_eq!(slug.as_str(), "monex");
        assert!(serde_json::from_str::<Slug>("\"Not Valid\"").is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(HexColor::parse("#FF6B35").is_some());
        assert!(HexColor::parse("#abc").is_some());
        assert!(HexColor::parse(" #00a95f ").is_some());
        assert!(HexColor::parse("FF6B35").is_none());
        assert!(HexColor::parse("#GGGGGG").is_none());
        assert!(HexColor::parse("#abcd").is_none());
        assert!(HexColor::new("red").is_err());
    }

    #[test]
    fn test_link_id_zero_is_none() {
        assert!(LinkId::from_raw(0).is_none());
        assert_eq!(LinkId::from_raw(42).map(LinkId::get), Some(42));
    }
}
