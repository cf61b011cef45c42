use std::collections::HashMap;

use super::*;

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn keeps_memory_and_full_urls() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("sqlite://./x.db?mode=rwc"),
        "sqlite://./x.db?mode=rwc"
    );
    assert_eq!(
        normalize_database_url("sqlite:data\\x.db"),
        "sqlite://data/x.db"
    );
}

#[test]
fn blank_database_url_uses_default() {
    assert_eq!(
        normalize_database_url("   "),
        Settings::default().database_url
    );
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
        database_url = "sqlite://./tmp/t.db"
        roster_path = "teams.json"
        "#,
    )
    .expect("toml");

    assert_eq!(settings.database_url, "sqlite://./tmp/t.db");
    assert_eq!(settings.roster_path, PathBuf::from("teams.json"));
    assert_eq!(settings.export_dir, PathBuf::from("."));
}

#[test]
fn malformed_file_is_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "database_url = [").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_tracker_prefix() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("TRACKER_DATABASE_URL", "sqlite://a.db"),
        ("APP__DATABASE_URL", "sqlite://b.db"),
        ("TRACKER_EXPORT_DIR", "out"),
        ("APP__LOG_FILTER", "debug"),
    ]);
    let mut settings = Settings::default();
    apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.database_url, "sqlite://b.db");
    assert_eq!(settings.export_dir, PathBuf::from("out"));
    assert_eq!(settings.log_filter, "debug");
    assert_eq!(settings.roster_path, Settings::default().roster_path);
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    assert!(load_settings(Some(&missing)).is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tracker.toml");
    fs::write(&path, "export_dir = \"exports\"\n").expect("write");

    let settings = load_settings(Some(&path)).expect("settings");
    assert_eq!(settings.export_dir, PathBuf::from("exports"));
}
