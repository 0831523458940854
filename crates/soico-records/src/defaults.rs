//! First-run seed data.
//!
//! Seeding only inserts documents that do not exist yet, so running it again
//! never overwrites admin edits.

use crate::{
    error::{RecordError, Result},
    family::RecordFamily,
    record::{BrokerRecord, LoanTerms},
    settings::{DesignSettings, TrackingSettings},
};
use serde::Serialize;
use soico_core::{HexColor, Slug};
use soico_db::{options, Database, Transients};
use std::collections::BTreeMap;
use tracing::info;

struct Seed {
    slug: &'static str,
    name: &'static str,
    features: &'static [&'static str],
    commission: &'static str,
    badge: Option<(&'static str, &'static str)>,
    button: (&'static str, &'static str),
    terms: Option<(&'static str, &'static str, &'static str)>,
}

const SECURITIES: &[Seed] = &[
    Seed {
        slug: "sbi",
        name: "SBI証券",
        features: &[
            "口座開設数1,400万突破、ネット証券No.1の実績",
            "国内株式の売買手数料が0円（ゼロ革命）",
            "クレカ積立でVポイントが貯まる",
        ],
        commission: "0円",
        badge: Some(("おすすめ", "#E53935")),
        button: ("SBI証券で口座開設（無料）", "#FF6B35"),
        terms: None,
    },
    Seed {
        slug: "monex",
        name: "マネックス証券",
        features: &["米国株に強い / 為替手数料0円キャンペーン", "dカード積立1.1%還元"],
        commission: "0円",
        badge: None,
        button: ("詳細を見る", "#666666"),
        terms: None,
    },
    Seed {
        slug: "rakuten",
        name: "楽天証券",
        features: &["楽天ポイント投資 / 楽天経済圏と連携"],
        commission: "0円",
        badge: None,
        button: ("詳細を見る", "#666666"),
        terms: None,
    },
    Seed {
        slug: "okasan",
        name: "岡三証券",
        features: &["定額プランで200万円まで手数料0円"],
        commission: "0円",
        badge: None,
        button: ("詳細を見る", "#666666"),
        terms: None,
    },
];

const CARD_LOANS: &[Seed] = &[
    Seed {
        slug: "aiful",
        name: "アイフル",
        features: &["最短25分で融資可能", "WEB完結で来店不要", "初めての方は30日間利息0円"],
        commission: "",
        badge: Some(("人気No.1", "#E53935")),
        button: ("今すぐ申し込む", "#00A95F"),
        terms: Some(("3.0%〜18.0%", "800万円", "最短25分")),
    },
    Seed {
        slug: "promise",
        name: "プロミス",
        features: &["最短3分で融資可能", "初回30日間無利息"],
        commission: "",
        badge: None,
        button: ("詳細を見る", "#00A95F"),
        terms: Some(("4.5%〜17.8%", "500万円", "最短3分")),
    },
    Seed {
        slug: "acom",
        name: "アコム",
        features: &["最短20分で融資可能", "初回30日間金利0円"],
        commission: "",
        badge: None,
        button: ("詳細を見る", "#00A95F"),
        terms: Some(("3.0%〜18.0%", "800万円", "最短20分")),
    },
    Seed {
        slug: "lake",
        name: "レイクALSA",
        features: &["選べる無利息サービス", "WEB完結対応"],
        commission: "",
        badge: None,
        button: ("詳細を見る", "#00A95F"),
        terms: Some(("4.5%〜18.0%", "500万円", "最短25分")),
    },
    Seed {
        slug: "mobit",
        name: "SMBCモビット",
        features: &["WEB完結で電話連絡なし", "Tポイントが貯まる"],
        commission: "",
        badge: None,
        button: ("詳細を見る", "#00A95F"),
        terms: Some(("3.0%〜18.0%", "800万円", "最短30分")),
    },
];

/// The records a fresh install starts with.
#[must_use]
pub fn default_records(family: RecordFamily) -> BTreeMap<Slug, BrokerRecord> {
    let seeds = match family {
        RecordFamily::Securities => SECURITIES,
        RecordFamily::CardLoan => CARD_LOANS,
    };

    seeds
        .iter()
        .zip(1..)
        .filter_map(|(seed, priority)| {
            let slug = Slug::new(seed.slug).ok()?;
            let record = BrokerRecord {
                priority,
                enabled: true,
                features: seed.features.iter().map(ToString::to_string).collect(),
                commission: seed.commission.to_string(),
                badge: seed.badge.map(|(text, _)| text.to_string()).unwrap_or_default(),
                badge_color: seed.badge.and_then(|(_, color)| HexColor::parse(color)),
                button_text: seed.button.0.to_string(),
                button_color: HexColor::parse(seed.button.1),
                loan_terms: seed.terms.map(|(rate, limit, review)| LoanTerms {
                    interest_rate: rate.to_string(),
                    limit_amount: limit.to_string(),
                    review_time: review.to_string(),
                }),
                ..BrokerRecord::new(family, slug.clone(), seed.name)
            };
            Some((slug, record))
        })
        .collect()
}

/// Insert default records and settings for both families where absent.
///
/// Returns the option keys that were created. Record caches are cleared.
pub async fn seed_defaults(db: &Database, transients: &Transients) -> Result<Vec<&'static str>> {
    let mut seeded = Vec::new();

    for family in RecordFamily::ALL {
        if insert(db, family.data_key(), &default_records(family)).await? {
            seeded.push(family.data_key());
        }
        if insert(db, family.design_key(), &DesignSettings::defaults(family)).await? {
            seeded.push(family.design_key());
        }
        if insert(db, family.tracking_key(), &TrackingSettings::defaults(family)).await? {
            seeded.push(family.tracking_key());
        }
        transients.forget(family.cache_key()).await;
    }

    info!(count = seeded.len(), keys = ?seeded, "seeded default options");
    Ok(seeded)
}

async fn insert<T: Serialize>(db: &Database, key: &'static str, value: &T) -> Result<bool> {
    let value = serde_json::to_value(value).map_err(|e| RecordError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(options::add_option(db.pool(), key, &value).await?)
}
