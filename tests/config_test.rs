//! Tests for loading the TOML configuration.

use std::io::Write;

use tempfile::NamedTempFile;

use number_master::{AppConfig, ReconcileStrategy};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_full_config() {
    let file = write_config(
        r#"
db_path = "scores.db"
strategy = "read_then_write"
log_filter = "warn"
"#,
    );

    let config = AppConfig::from_file(file.path()).expect("Valid config");
    assert_eq!(config.db_path(), "scores.db");
    assert_eq!(*config.strategy(), ReconcileStrategy::ReadThenWrite);
    assert_eq!(config.log_filter(), "warn");
}

#[test]
fn test_partial_config_uses_defaults() {
    let file = write_config(r#"db_path = "other.db""#);

    let config = AppConfig::from_file(file.path()).expect("Valid config");
    assert_eq!(config.db_path(), "other.db");
    assert_eq!(*config.strategy(), ReconcileStrategy::ConditionalUpsert);
    assert_eq!(config.log_filter(), AppConfig::default().log_filter());
}

#[test]
fn test_unknown_strategy_rejected() {
    let file = write_config(r#"strategy = "yolo""#);
    let err = AppConfig::from_file(file.path()).expect_err("Invalid strategy");
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = AppConfig::load_or_default(dir.path().join("absent.toml")).expect("Defaults");
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.db_path(), "number_master.db");
}

#[test]
fn test_overrides() {
    let config = AppConfig::default()
        .with_db_path("cli.db")
        .with_strategy(ReconcileStrategy::ReadThenWrite);
    assert_eq!(config.db_path(), "cli.db");
    assert_eq!(*config.strategy(), ReconcileStrategy::ReadThenWrite);
}
