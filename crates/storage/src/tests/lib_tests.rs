use std::collections::BTreeMap;

use shared::domain::{EntryId, LogEntry, PlayerId};

use super::*;

#[tokio::test]
async fn stores_and_overwrites_values() {
    let store = SqliteStateStore::new("sqlite::memory:").await.expect("db");
    store.set("k", "1").await.expect("set");
    store.set("k", "2").await.expect("overwrite");
    assert_eq!(store.get("k").await.expect("get").as_deref(), Some("2"));
}

#[tokio::test]
async fn remove_deletes_key_and_tolerates_absent_key() {
    let store = SqliteStateStore::new("sqlite::memory:").await.expect("db");
    store.set("k", "v").await.expect("set");
    store.remove("k").await.expect("remove");
    store.remove("never-written").await.expect("remove absent");
    assert_eq!(store.get("k").await.expect("get"), None);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = SqliteStateStore::new("sqlite::memory:").await.expect("db");
    store.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("tracker.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let store = SqliteStateStore::new(&database_url).await.expect("db");
    drop(store);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn load_slice_defaults_when_key_absent() {
    let store = MemoryStateStore::new();
    let team: String = load_slice(&store, keys::SELECTED_TEAM).await;
    let log: Vec<serde_json::Value> = load_slice(&store, keys::ACTION_LOG).await;
    let active: BTreeMap<String, bool> = load_slice(&store, keys::ACTIVE_PLAYERS).await;
    assert_eq!(team, "");
    assert!(log.is_empty());
    assert!(active.is_empty());
}

#[tokio::test]
async fn load_slice_defaults_on_malformed_json() {
    let store = MemoryStateStore::new();
    store
        .set(keys::ACTION_LOG, "[{\"playerId\": 1,")
        .await
        .expect("set");
    store.set(keys::SELECTED_TEAM, "null").await.expect("set");

    let log: Vec<serde_json::Value> = load_slice(&store, keys::ACTION_LOG).await;
    let team: String = load_slice(&store, keys::SELECTED_TEAM).await;
    assert!(log.is_empty());
    assert_eq!(team, "");
}

#[tokio::test]
async fn load_list_skips_only_undecodable_elements() {
    let store = MemoryStateStore::new();
    store
        .set(
            keys::ACTION_LOG,
            r#"[{"playerId": 1, "number": 7}, {"playerId": null}, {"playerId": "7_t"}]"#,
        )
        .await
        .expect("set");

    let log: Vec<LogEntry> = load_list(&store, keys::ACTION_LOG).await;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].player_id, EntryId::Roster(PlayerId(1)));
    assert_eq!(log[1].player_id, EntryId::Imported("7_t".into()));

    store.set(keys::ACTION_LOG, "{}").await.expect("set");
    let log: Vec<LogEntry> = load_list(&store, keys::ACTION_LOG).await;
    assert!(log.is_empty());
}

#[tokio::test]
async fn save_slice_writes_json_encoding() {
    let store = MemoryStateStore::new();
    save_slice(&store, keys::SELECTED_TEAM, "Blue")
        .await
        .expect("save");
    assert_eq!(
        store.get(keys::SELECTED_TEAM).await.expect("get").as_deref(),
        Some("\"Blue\"")
    );

    let team: String = load_slice(&store, keys::SELECTED_TEAM).await;
    assert_eq!(team, "Blue");
}

#[test]
fn sqlite_path_ignores_memory_and_query_suffix() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/tracker.db?mode=rwc"),
        Some(PathBuf::from("./data/tracker.db"))
    );
}
