//! Record model and admin-input sanitization.
//!
//! Stored records are always the output of [`sanitize_record`]; admin input
//! arrives as loosely-typed JSON (strings for numbers, newline-separated
//! feature text, missing keys) and is normalised field by field.

use crate::family::RecordFamily;
use crate::input::{absint, color, features, text, truthy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use soico_core::sanitize::sanitize_url;
use soico_core::{HexColor, LinkId, Slug};
use std::collections::BTreeMap;

/// Priority given to records that do not specify one.
pub const DEFAULT_PRIORITY: u32 = 99;

/// Card-loan specific display fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Annual interest range, e.g. `3.0%〜18.0%`
    #[serde(default)]
    pub interest_rate: String,
    /// Credit limit, e.g. `800万円`
    #[serde(default)]
    pub limit_amount: String,
    /// Review time, e.g. `最短25分`
    #[serde(default)]
    pub review_time: String,
}

/// A broker or lender as persisted in the option store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerRecord {
    /// Key in the stored mapping
    pub slug: Slug,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Sort key, lower first
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Disabled records stay editable but are not listed publicly
    #[serde(default)]
    pub enabled: bool,
    /// Entity in the link-cloaking service
    #[serde(default)]
    pub link_ref: Option<LinkId>,
    /// Fallback URL when `link_ref` resolves to nothing
    #[serde(default)]
    pub direct_url: Option<String>,
    /// Short selling points, in display order
    #[serde(default)]
    pub features: Vec<String>,
    /// Commission text
    #[serde(default)]
    pub commission: String,
    /// Badge text
    #[serde(default)]
    pub badge: String,
    /// Badge colour
    #[serde(default)]
    pub badge_color: Option<HexColor>,
    /// Button label
    #[serde(default)]
    pub button_text: String,
    /// Button colour
    #[serde(default)]
    pub button_color: Option<HexColor>,
    /// Card-loan terms; absent for securities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_terms: Option<LoanTerms>,
}

fn default_priority() -> u32 {
    DEFAULT_PRIORITY
}

impl BrokerRecord {
    /// A bare record as created by the add operation.
    #[must_use]
    pub fn new(family: RecordFamily, slug: Slug, name: impl Into<String>) -> Self {
        Self {
            slug,
            name: name.into(),
            priority: DEFAULT_PRIORITY,
            enabled: false,
            link_ref: None,
            direct_url: None,
            features: Vec::new(),
            commission: String::new(),
            badge: String::new(),
            badge_color: None,
            button_text: String::new(),
            button_color: HexColor::parse(family.primary_color()),
            loan_terms: match family {
                RecordFamily::Securities => None,
                RecordFamily::CardLoan => Some(LoanTerms::default()),
            },
        }
    }

    /// The flat admin shape of this record, suitable for [`sanitize_record`].
    #[must_use]
    pub fn to_input(&self) -> Value {
        let mut input = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        if let Some(Value::Object(terms)) = input.remove("loan_terms") {
            input.extend(terms);
        }
        Value::Object(input)
    }
}

/// A record together with its resolved outbound URL.
///
/// The URL is derived on every read and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    /// Stored record
    pub record: BrokerRecord,
    /// Effective affiliate URL; `None` makes the record unusable for rendering
    pub affiliate_url: Option<String>,
}

impl ResolvedRecord {
    /// Record slug.
    #[must_use]
    pub fn slug(&self) -> &Slug {
        &self.record.slug
    }

    /// Whether the record can be rendered as a link.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.affiliate_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Input of the add operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Requested slug, sanitized before use
    pub slug: String,
    /// Display name, sanitized before use
    pub name: String,
    /// Initial enabled state
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Sanitize a submitted collection keyed by slug.
///
/// Keys that sanitize to nothing are dropped; when two keys collapse to the
/// same slug the later one wins.
#[must_use]
pub fn sanitize_collection(
    family: RecordFamily,
    input: &Map<String, Value>,
) -> BTreeMap<Slug, BrokerRecord> {
    input
        .iter()
        .filter_map(|(key, item)| {
            let slug = Slug::sanitize(key)?;
            let record = sanitize_record(family, slug.clone(), item);
            Some((slug, record))
        })
        .collect()
}

/// Sanitize one submitted record. Unknown keys are ignored, missing keys defaulted.
#[must_use]
pub fn sanitize_record(family: RecordFamily, slug: Slug, item: &Value) -> BrokerRecord {
    let field = |key: &str| item.get(key).filter(|v| !v.is_null());

    let priority = field("priority").map_or(DEFAULT_PRIORITY, |v| {
        u32::try_from(absint(v)).unwrap_or(u32::MAX)
    });

    let button_color = match field("button_color") {
        None => HexColor::parse(family.primary_color()),
        Some(v) => color(v),
    };

    let loan_terms = match family {
        RecordFamily::Securities => None,
        RecordFamily::CardLoan => Some(LoanTerms {
            interest_rate: field("interest_rate").map(text).unwrap_or_default(),
            limit_amount: field("limit_amount").map(text).unwrap_or_default(),
            review_time: field("review_time").map(text).unwrap_or_default(),
        }),
    };

    BrokerRecord {
        slug,
        name: field("name").map(text).unwrap_or_default(),
        priority,
        enabled: field("enabled").is_some_and(truthy),
        link_ref: field("link_ref").and_then(|v| LinkId::from_raw(absint(v))),
        direct_url: field("direct_url").and_then(|v| sanitize_url(&text(v))),
        features: field("features").map(features).unwrap_or_default(),
        commission: field("commission").map(text).unwrap_or_default(),
        badge: field("badge").map(text).unwrap_or_default(),
        badge_color: field("badge_color").and_then(color),
        button_text: field("button_text").map(text).unwrap_or_default(),
        button_color,
        loan_terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slug(s: &str) -> Slug {
        Slug::new(s).expect("valid slug")
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let record = sanitize_record(RecordFamily::Securities, slug("sbi"), &json!({}));

        assert_eq!(record.name, "");
        assert_eq!(record.priority, DEFAULT_PRIORITY);
        assert!(!record.enabled);
        assert_eq!(record.link_ref, None);
        assert_eq!(record.direct_url, None);
        assert!(record.features.is_empty());
        assert_eq!(record.button_color.as_ref().map(HexColor::as_str), Some("#FF6B35"));
        assert!(record.loan_terms.is_none());
    }

    #[test]
    fn test_loose_scalars() {
        let record = sanitize_record(
            RecordFamily::Securities,
            slug("monex"),
            &json!({
                "name": "  <b>マネックス</b>   証券 ",
                "priority": "-3",
                "enabled": "1",
                "link_ref": "42",
                "direct_url": "javascript:alert(1)",
                "badge_color": "red",
                "button_color": "#666666",
                "unknown": "dropped"
            }),
        );

        assert_eq!(record.name, "マネックス 証券");
        assert_eq!(record.priority, 3);
        assert!(record.enabled);
        assert_eq!(record.link_ref.map(LinkId::get), Some(42));
        assert_eq!(record.direct_url, None);
        assert_eq!(record.badge_color, None);
        assert_eq!(record.button_color.as_ref().map(HexColor::as_str), Some("#666666"));
    }

    #[test]
    fn test_features_from_newline_string() {
        let record = sanitize_record(
            RecordFamily::Securities,
            slug("sbi"),
            &json!({ "features": " 手数料0円 \n\n  クレカ積立  \r\n" }),
        );
        assert_eq!(record.features, vec!["手数料0円", "クレカ積立"]);
    }

    #[test]
    fn test_features_from_list() {
        let record = sanitize_record(
            RecordFamily::Securities,
            slug("sbi"),
            &json!({ "features": ["a", "  ", "<i>b</i>"] }),
        );
        assert_eq!(record.features, vec!["a", "b"]);
    }

    #[test]
    fn test_enabled_truthiness() {
        for (value, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(0), false),
            (json!(2), true),
            (json!("0"), false),
            (json!(""), false),
            (json!("yes"), true),
        ] {
            let record = sanitize_record(
                RecordFamily::Securities,
                slug("x"),
                &json!({ "enabled": value }),
            );
            assert_eq!(record.enabled, expected, "enabled = {value}");
        }
    }

    #[test]
    fn test_card_loan_terms() {
        let record = sanitize_record(
            RecordFamily::CardLoan,
            slug("aiful"),
            &json!({
                "interest_rate": "3.0%〜18.0%",
                "limit_amount": "800万円",
                "review_time": "最短25分"
            }),
        );

        let terms = record.loan_terms.expect("card-loan record has terms");
        assert_eq!(terms.interest_rate, "3.0%〜18.0%");
        assert_eq!(terms.limit_amount, "800万円");
        assert_eq!(terms.review_time, "最短25分");
        assert_eq!(record.button_color.as_ref().map(HexColor::as_str), Some("#00A95F"));
    }

    #[test]
    fn test_collection_drops_empty_keys() {
        let input = json!({
            "SBI": { "name": "SBI証券" },
            "!!!": { "name": "dropped" }
        });
        let map = sanitize_collection(
            RecordFamily::Securities,
            input.as_object().expect("object"),
        );

        assert_eq!(map.len(), 1);
        assert_eq!(map[&slug("sbi")].name, "SBI証券");
    }

    #[test]
    fn test_resanitizing_is_stable() {
        let first = sanitize_record(
            RecordFamily::CardLoan,
            slug("promise"),
            &json!({
                "name": "プロミス",
                "priority": 2,
                "enabled": true,
                "features": "a\nb",
                "interest_rate": "4.5%〜17.8%"
            }),
        );
        let second = sanitize_record(RecordFamily::CardLoan, slug("promise"), &first.to_input());
        assert_eq!(first, second);
    }

    #[test]
    fn test_usable_requires_url() {
        let record = BrokerRecord::new(RecordFamily::Securities, slug("sbi"), "SBI証券");
        let resolved = ResolvedRecord {
            record,
            affiliate_url: Some(String::new()),
        };
        assert!(!resolved.is_usable());
    }
}
