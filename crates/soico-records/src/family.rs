//! Record families and their storage keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A family of affiliate records with its own collection and settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFamily {
    /// Securities brokers
    Securities,
    /// Card-loan lenders
    #[serde(rename = "cardloan")]
    CardLoan,
}

impl RecordFamily {
    /// Both families, securities first.
    pub const ALL: [Self; 2] = [Self::Securities, Self::CardLoan];

    /// Short identifier used in keys and block names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Securities => "securities",
            Self::CardLoan => "cardloan",
        }
    }

    /// Option key of the record collection.
    #[must_use]
    pub fn data_key(self) -> &'static str {
        match self {
            Self::Securities => "soico_cta_v1_securities_data",
            Self::CardLoan => "soico_cta_v1_cardloan_data",
        }
    }

    /// Option key of the design settings.
    #[must_use]
    pub fn design_key(self) -> &'static str {
        match self {
            Self::Securities => "soico_cta_v1_securities_design",
            Self::CardLoan => "soico_cta_v1_cardloan_design",
        }
    }

    /// Option key of the tracking settings.
    #[must_use]
    pub fn tracking_key(self) -> &'static str {
        match self {
            Self::Securities => "soico_cta_v1_securities_tracking",
            Self::CardLoan => "soico_cta_v1_cardloan_tracking",
        }
    }

    /// Transient key of the resolved record list.
    #[must_use]
    pub fn cache_key(self) -> &'static str {
        match self {
            Self::Securities => "soico_cta_securities_cache",
            Self::CardLoan => "soico_cta_cardloan_cache",
        }
    }

    /// Record used by single-company widgets when none is named.
    #[must_use]
    pub fn default_slug(self) -> &'static str {
        match self {
            Self::Securities => "sbi",
            Self::CardLoan => "aiful",
        }
    }

    /// Brand colour; also the default button colour.
    #[must_use]
    pub fn primary_color(self) -> &'static str {
        match self {
            Self::Securities => "#FF6B35",
            Self::CardLoan => "#00A95F",
        }
    }

    /// Accent colour.
    #[must_use]
    pub fn secondary_color(self) -> &'static str {
        match self {
            Self::Securities => "#1E88E5",
            Self::CardLoan => "#2E7D32",
        }
    }

    /// Default GTM event action.
    #[must_use]
    pub fn event_action(self) -> &'static str {
        match self {
            Self::Securities => "securities_affiliate",
            Self::CardLoan => "cardloan_affiliate",
        }
    }
}

impl fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "securities" | "security" => Ok(Self::Securities),
            "cardloan" | "card-loan" | "card_loan" => Ok(Self::CardLoan),
            other => Err(format!("unknown record family: {other}")),
        }
    }
}
