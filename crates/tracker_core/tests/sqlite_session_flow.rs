use shared::domain::{EntryId, JerseyNumber, PlayerId};
use storage::SqliteStateStore;
use tracker_core::{ImportKind, ImportOutcome, Roster, TrackerSession};

const ROSTER: &str = r#"[
    {"id": 1, "number": 7, "subject": "S1", "team": "A"},
    {"id": 2, "number": 9, "subject": "S2", "team": "A"},
    {"id": 3, "number": 11, "subject": "S3", "team": "B"}
]"#;

fn database_url(dir: &std::path::Path) -> String {
    format!(
        "sqlite://{}",
        dir.join("state").join("tracker.db").to_string_lossy().replace('\\', "/")
    )
}

#[tokio::test]
async fn exported_log_reimports_after_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(dir.path());

    let export = {
        let store = SqliteStateStore::new(&url).await.expect("db");
        let mut session = TrackerSession::hydrate(Roster::from_json(ROSTER).expect("roster"), store)
            .await
            .expect("session");
        session.toggle(PlayerId(1)).await.expect("toggle");
        session.toggle(PlayerId(3)).await.expect("toggle");
        session.deactivate_all_active().await.expect("deactivate");
        session.export_csv().expect("export")
    };
    let export_path = export.write_to(&dir.path().join("exports")).expect("write");

    let store = SqliteStateStore::new(&url).await.expect("reopen");
    let mut session = TrackerSession::hydrate(Roster::from_json(ROSTER).expect("roster"), store)
        .await
        .expect("session");
    assert_eq!(session.action_log().len(), 4);
    assert!(!session.is_active(PlayerId(1)));
    assert_eq!(session.selected_team(), "A");

    session.clear().await.expect("clear");
    let pending = session.begin_import(export_path, ImportKind::ActionLog);
    let outcome = session.finish_import(pending).await.expect("import");
    assert_eq!(
        outcome,
        ImportOutcome::Applied {
            kind: ImportKind::ActionLog,
            rows: 4
        }
    );

    let actions: Vec<_> = session
        .action_log()
        .iter()
        .map(|e| (e.number.clone(), e.action.as_deref()))
        .collect();
    assert_eq!(
        actions,
        vec![
            (Some(JerseyNumber::Text("7".into())), Some("OFF")),
            (Some(JerseyNumber::Text("11".into())), Some("OFF")),
            (Some(JerseyNumber::Text("11".into())), Some("ON")),
            (Some(JerseyNumber::Text("7".into())), Some("ON")),
        ]
    );
    assert!(session
        .action_log()
        .iter()
        .all(|e| matches!(e.player_id, EntryId::Imported(_))));
    assert!(session.active_map().is_empty());
}
