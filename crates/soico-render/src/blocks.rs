//! Block names and their attribute bags.
//!
//! Blocks are named `soico-cta/<widget>` for securities and
//! `soico-cta/cardloan-<widget>` for card loans. Attributes arrive as the
//! editor's camelCase JSON; every field has a default.

use serde::{Deserialize, Serialize};
use soico_records::RecordFamily;
use std::fmt;

/// Namespace shared by every block name.
pub const BLOCK_NAMESPACE: &str = "soico-cta";

const CARD_LOAN_PREFIX: &str = "cardloan-";

/// The five widget variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    /// Headline box with features and a primary button
    ConclusionBox,
    /// One-line name, feature and button
    InlineCta,
    /// A lone button
    SingleButton,
    /// Ranked table of enabled records
    ComparisonTable,
    /// Low-key sentence with an inline link
    SubtleBanner,
}

impl Widget {
    /// All widgets.
    pub const ALL: [Self; 5] = [
        Self::ConclusionBox,
        Self::InlineCta,
        Self::SingleButton,
        Self::ComparisonTable,
        Self::SubtleBanner,
    ];

    /// Block name segment (`conclusion-box`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConclusionBox => "conclusion-box",
            Self::InlineCta => "inline-cta",
            Self::SingleButton => "single-button",
            Self::ComparisonTable => "comparison-table",
            Self::SubtleBanner => "subtle-banner",
        }
    }

    /// Value of the `data-cta-type` tracking attribute.
    #[must_use]
    pub fn cta_type(self) -> &'static str {
        match self {
            Self::ConclusionBox => "conclusion_box",
            Self::InlineCta => "inline_cta",
            Self::SingleButton => "single_button",
            Self::ComparisonTable => "comparison_table",
            Self::SubtleBanner => "subtle_banner",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == segment)
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A family and widget pair addressed by one block name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockName {
    /// Record family
    pub family: RecordFamily,
    /// Widget variant
    pub widget: Widget,
}

impl BlockName {
    /// Parse `soico-cta/<widget>` or `soico-cta/cardloan-<widget>`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(BLOCK_NAMESPACE)?.strip_prefix('/')?;
        let (family, segment) = match rest.strip_prefix(CARD_LOAN_PREFIX) {
            Some(segment) => (RecordFamily::CardLoan, segment),
            None => (RecordFamily::Securities, rest),
        };
        Widget::from_segment(segment).map(|widget| Self { family, widget })
    }

    /// Every registered block.
    #[must_use]
    pub fn all() -> Vec<Self> {
        RecordFamily::ALL
            .into_iter()
            .flat_map(|family| Widget::ALL.into_iter().map(move |widget| Self { family, widget }))
            .collect()
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            RecordFamily::Securities => write!(f, "{BLOCK_NAMESPACE}/{}", self.widget),
            RecordFamily::CardLoan => {
                write!(f, "{BLOCK_NAMESPACE}/{CARD_LOAN_PREFIX}{}", self.widget)
            }
        }
    }
}

fn default_style() -> String {
    "default".to_string()
}

fn default_limit() -> usize {
    3
}

/// Attributes of the conclusion box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConclusionBoxAttrs {
    /// Record slug; the family default when absent
    pub company: Option<String>,
    /// List the record's features
    pub show_features: bool,
    /// Heading override
    pub custom_title: String,
    /// Button text override
    pub button_text: String,
}

impl Default for ConclusionBoxAttrs {
    fn default() -> Self {
        Self {
            company: None,
            show_features: true,
            custom_title: String::new(),
            button_text: String::new(),
        }
    }
}

/// Attributes of the inline CTA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineCtaAttrs {
    /// Record slug; the family default when absent
    pub company: Option<String>,
    /// Style variant, appended to the wrapper class
    pub style: String,
    /// Button text override
    pub button_text: String,
}

impl Default for InlineCtaAttrs {
    fn default() -> Self {
        Self {
            company: None,
            style: default_style(),
            button_text: String::new(),
        }
    }
}

/// Attributes of the single button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SingleButtonAttrs {
    /// Record slug; the family default when absent
    pub company: Option<String>,
    /// Button text override
    pub button_text: String,
    /// Show the PR label under the button
    #[serde(rename = "showPR")]
    pub show_pr: bool,
}

impl Default for SingleButtonAttrs {
    fn default() -> Self {
        Self {
            company: None,
            button_text: String::new(),
            show_pr: true,
        }
    }
}

/// Attributes of the comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonTableAttrs {
    /// Maximum rows; 0 means all
    pub limit: usize,
    /// Restrict rows to these slugs; empty means every enabled record
    pub companies: Vec<String>,
    /// Securities: commission column
    pub show_commission: bool,
    /// Card loans: interest rate column
    pub show_interest_rate: bool,
    /// Card loans: limit amount column
    pub show_limit_amount: bool,
    /// Card loans: review time column
    pub show_review_time: bool,
}

impl Default for ComparisonTableAttrs {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            companies: Vec::new(),
            show_commission: true,
            show_interest_rate: true,
            show_limit_amount: true,
            show_review_time: true,
        }
    }
}

/// Attributes of the subtle banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubtleBannerAttrs {
    /// Record slug; the family default when absent
    pub company: Option<String>,
    /// Message override; the record name inside it becomes the link
    pub message: String,
}

/// The slug a single-record widget should show.
#[must_use]
pub fn company_or_default(company: Option<&str>, family: RecordFamily) -> &str {
    company
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| family.default_slug())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_block_names() {
        assert_eq!(
            BlockName::parse("soico-cta/conclusion-box"),
            Some(BlockName {
                family: RecordFamily::Securities,
                widget: Widget::ConclusionBox,
            })
        );
        assert_eq!(
            BlockName::parse("soico-cta/cardloan-comparison-table"),
            Some(BlockName {
                family: RecordFamily::CardLoan,
                widget: Widget::ComparisonTable,
            })
        );
        assert_eq!(BlockName::parse("soico-cta/hero"), None);
        assert_eq!(BlockName::parse("core/paragraph"), None);
        assert_eq!(BlockName::parse("soico-ctax/inline-cta"), None);
    }

    #[test]
    fn test_names_round_trip() {
        let all = BlockName::all();
        assert_eq!(all.len(), 10);
        for block in all {
            assert_eq!(BlockName::parse(&block.to_string()), Some(block));
        }
    }

    #[test]
    fn test_attribute_defaults() {
        let attrs: ComparisonTableAttrs = serde_json::from_value(json!({})).expect("decode");
        assert_eq!(attrs, ComparisonTableAttrs::default());
        assert_eq!(attrs.limit, 3);

        let attrs: SingleButtonAttrs =
            serde_json::from_value(json!({ "showPR": false, "buttonText": "Go" })).expect("decode");
        assert!(!attrs.show_pr);
        assert_eq!(attrs.button_text, "Go");

        let attrs: ConclusionBoxAttrs =
            serde_json::from_value(json!({ "company": "monex" })).expect("decode");
        assert!(attrs.show_features);
        assert_eq!(attrs.company.as_deref(), Some("monex"));
    }

    #[test]
    fn test_company_or_default() {
        assert_eq!(company_or_default(None, RecordFamily::Securities), "sbi");
        assert_eq!(company_or_default(Some(" "), RecordFamily::CardLoan), "aiful");
        assert_eq!(company_or_default(Some("acom"), RecordFamily::CardLoan), "acom");
    }
}
