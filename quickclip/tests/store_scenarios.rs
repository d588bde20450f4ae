//! End-to-end store scenarios against an on-disk cache.
//!
//! Covers the session lifecycle: populate, mutate, restart from the snapshot,
//! refresh from a remote document, and round-trip through export/import.

use std::time::Duration;

use chrono::Utc;
use mockito::{Matcher, Server};
use quickclip::database::Database;
use quickclip::remote::HttpItemSource;
use quickclip::{ItemStore, QuickClipError, RefreshOutcome};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> ItemStore {
    let db = Database::open(dir.path().join("cache.sqlite")).unwrap();
    ItemStore::new(db)
}

fn view_labels(store: &ItemStore) -> Vec<String> {
    store.filtered_view().iter().map(|i| i.label.clone()).collect()
}

#[test]
fn mutations_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let mut store = open_store(&dir);
        store.bulk_add("greeting = Hello there\nsign-off = Kind regards", "Phrases");
        store.add("upn", "admin@example.test", "UPNs").unwrap();
        store.set_query("hello");
        store.select(0).unwrap();
        store.edit("greeting", "Hello!", "Phrases").unwrap();
    }

    let mut store = open_store(&dir);
    assert_eq!(store.load_from_cache().unwrap(), Some(3));
    assert_eq!(view_labels(&store), vec!["upn", "sign-off", "greeting"]);
    assert_eq!(store.categories(), vec!["All", "Phrases", "UPNs"]);
    assert_eq!(store.items()[2].value, "Hello!");
}

#[test]
fn import_file_merges_against_existing() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.add("p", "q", "Z").unwrap();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let path = dir.path().join("import.json");
    std::fs::write(&path, r#"{"items":[{"label":"p","value":"q"},{"label":"r","value":"s"}]}"#).unwrap();

    let summary = rt.block_on(store.import_file(&path)).unwrap();
    assert_eq!(summary.added, 1);
    assert_eq!(view_labels(&store), vec!["p", "r"]);
    assert_eq!(store.items()[0].category, "Z");
}

#[test]
fn export_then_import_into_fresh_store() {
    let source_dir = TempDir::new().unwrap();
    let mut source = open_store(&source_dir);
    source.bulk_add("a=1\nb=2\nc", "Cat");
    let export_path = source.export_to_dir(source_dir.path(), Utc::now()).unwrap();

    let target_dir = TempDir::new().unwrap();
    let mut target = open_store(&target_dir);
    let text = std::fs::read_to_string(&export_path).unwrap();
    let summary = target.import_json(&text).unwrap();

    assert_eq!(summary.added, 3);
    assert_eq!(view_labels(&target), view_labels(&source));
    assert!(target.items().iter().all(|i| i.category == "Cat"));
}

#[tokio::test]
async fn remote_refresh_then_outage_falls_back_to_snapshot() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let url = format!("{}/items.json", server.url());

    let ok = server
        .mock("GET", "/items.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"label":"remote","value":"r","category":"Net"}]"#)
        .expect(1)
        .create_async()
        .await;

    let source = HttpItemSource::new(&url, Duration::from_secs(5)).unwrap();
    let mut store = open_store(&dir).with_remote_source(source);
    let outcome = store.refresh_from_remote().await;
    assert!(outcome.is_remote(), "got {outcome:?}");
    ok.assert_async().await;
    ok.remove_async().await;

    // Local edit after the refresh lands in the snapshot
    store.add("local", "l", "").unwrap();

    let _down = server
        .mock("GET", "/items.json")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let source = HttpItemSource::new(&url, Duration::from_secs(5)).unwrap();
    let mut restarted = open_store(&dir).with_remote_source(source);
    match restarted.refresh_from_remote().await {
        RefreshOutcome::Cached { count, reason } => {
            assert_eq!(count, 2);
            assert!(matches!(reason, QuickClipError::Fetch(_)));
        }
        other => panic!("expected cache fallback, got {other:?}"),
    }
    assert_eq!(view_labels(&restarted), vec!["local", "remote"]);
}
