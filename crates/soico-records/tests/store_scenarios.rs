//! Integration tests for record store lifecycle scenarios.

use serde_json::{json, Map, Value};
use soico_core::LinkId;
use soico_db::{Database, Transients};
use soico_links::{LinkDirectory, LinkEntity, LinkEvent, LinkResolver, DEFAULT_ENTITY_KIND};
use soico_records::{
    seed_defaults, AdminService, NewRecord, RecordError, RecordFamily, RecordStore,
    SettingsStore,
};
use std::sync::Arc;
use url::Url;

struct Fixture {
    db: Database,
    directory: LinkDirectory,
    store: RecordStore,
}

async fn fixture(family: RecordFamily) -> Fixture {
    let db = Database::in_memory().await.expect("create db");
    let directory = LinkDirectory::new();
    let transients = Transients::memory();
    let links = LinkResolver::new(
        Arc::new(directory.clone()),
        transients.clone(),
        Url::parse("https://media.example.jp").expect("valid url"),
    );
    let store = RecordStore::new(family, db.clone(), transients, links);
    Fixture {
        db,
        directory,
        store,
    }
}

fn submission(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object submission")
}

fn link(id: u64, slug: &str) -> LinkEntity {
    LinkEntity {
        id: LinkId::from_raw(id).expect("non-zero id"),
        kind: DEFAULT_ENTITY_KIND.to_string(),
        slug: slug.to_string(),
        title: slug.to_uppercase(),
        published: true,
        categories: Vec::new(),
    }
}

#[tokio::test]
async fn test_add_after_priority_four_gets_five() {
    let fx = fixture(RecordFamily::Securities).await;
    seed_defaults(&fx.db, &Transients::disabled())
        .await
        .expect("seed");

    let added = fx
        .store
        .add(&NewRecord {
            slug: "newco".to_string(),
            name: "New Co".to_string(),
            enabled: false,
        })
        .await
        .expect("add");

    assert_eq!(added.priority, 5);
    assert!(!added.enabled);

    let all = fx.store.list_all(true).await.expect("list");
    assert_eq!(all.last().map(|r| r.slug().as_str()), Some("newco"));
}

#[tokio::test]
async fn test_delete_missing_leaves_store_unchanged() {
    let fx = fixture(RecordFamily::Securities).await;
    seed_defaults(&fx.db, &Transients::disabled())
        .await
        .expect("seed");

    let before = fx.store.load().await.expect("load");
    let result = fx.store.delete("does-not-exist").await;

    assert!(matches!(result, Err(RecordError::NotFound { .. })));
    assert_eq!(fx.store.load().await.expect("load"), before);
}

#[tokio::test]
async fn test_newline_features_are_split() {
    let fx = fixture(RecordFamily::Securities).await;
    let admin = AdminService::new(fx.store.clone());

    let response = admin
        .save(&json!({
            "sbi": {
                "name": "SBI証券",
                "enabled": "1",
                "features": "  国内株手数料0円\n\n クレカ積立 \n"
            }
        }))
        .await;
    assert!(response.success);

    let sbi = fx.store.get("sbi").await.expect("get").expect("exists");
    assert_eq!(sbi.record.features, vec!["国内株手数料0円", "クレカ積立"]);
}

#[tokio::test]
async fn test_unresolvable_link_falls_back_to_direct_url() {
    let fx = fixture(RecordFamily::CardLoan).await;
    fx.directory.insert(link(3, "promise"), None);

    fx.store
        .save(&submission(json!({
            "promise": { "name": "プロミス", "link_ref": 3, "direct_url": "https://promise.example/" },
            "acom": { "name": "アコム", "link_ref": 404, "direct_url": "https://acom.example/" }
        })))
        .await
        .expect("save");

    let promise = fx.store.get("promise").await.expect("get").expect("exists");
    assert_eq!(
        promise.affiliate_url.as_deref(),
        Some("https://media.example.jp/recommends/promise/")
    );

    let acom = fx.store.get("acom").await.expect("get").expect("exists");
    assert_eq!(acom.affiliate_url.as_deref(), Some("https://acom.example/"));
}

#[tokio::test]
async fn test_inactive_link_service_uses_direct_urls() {
    let fx = fixture(RecordFamily::Securities).await;
    fx.directory.insert(link(1, "sbi"), None);
    fx.directory.set_active(false);

    fx.store
        .save(&submission(json!({
            "sbi": { "name": "SBI", "link_ref": 1, "direct_url": "https://sbi.example/" }
        })))
        .await
        .expect("save");

    let sbi = fx.store.get("sbi").await.expect("get").expect("exists");
    assert_eq!(sbi.affiliate_url.as_deref(), Some("https://sbi.example/"));
}

#[tokio::test]
async fn test_link_event_and_record_cache_refresh() {
    let fx = fixture(RecordFamily::Securities).await;
    fx.store
        .save(&submission(json!({
            "sbi": { "name": "SBI", "link_ref": 9, "direct_url": "https://sbi.example/" }
        })))
        .await
        .expect("save");

    // Warm cache holds the direct URL.
    let cached = fx.store.get("sbi").await.expect("get").expect("exists");
    assert_eq!(cached.affiliate_url.as_deref(), Some("https://sbi.example/"));

    // The link appears; the record cache is stale until cleared.
    fx.directory.insert(link(9, "sbi-go"), None);
    let event = LinkEvent::Saved {
        id: LinkId::from_raw(9).expect("non-zero id"),
        kind: DEFAULT_ENTITY_KIND.to_string(),
    };
    assert!(fx.store.links().handle_event(&event).await);
    fx.store.clear_record_cache().await;

    let fresh = fx.store.get("sbi").await.expect("get").expect("exists");
    assert_eq!(
        fresh.affiliate_url.as_deref(),
        Some("https://media.example.jp/recommends/sbi-go/")
    );
}

#[tokio::test]
async fn test_seeded_settings_are_readable() {
    let fx = fixture(RecordFamily::CardLoan).await;
    seed_defaults(&fx.db, &Transients::disabled())
        .await
        .expect("seed");

    let settings = SettingsStore::new(RecordFamily::CardLoan, fx.db.clone());
    let tracking = settings.tracking().await.expect("tracking");
    assert_eq!(tracking.event_action, "cardloan_affiliate");

    let top = fx.store.top().await.expect("top").expect("seeded");
    assert_eq!(top.slug().as_str(), "aiful");
    assert!(!top.is_usable());
}
