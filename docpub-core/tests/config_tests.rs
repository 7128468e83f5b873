//! Config error-message, atomic-write-safety, and init integration tests.

use assert_fs::prelude::*;
use docpub_core::{config, ConfigError, RemoteConfig};
use predicates::prelude::predicate;
use std::fs;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(&config::config_path_in(dir.path())).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config not found"));
    assert!(err.to_string().contains("docpub.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("docpub.yaml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("docpub.yaml"), "must contain file path, got: {msg}");
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("docpub.yaml");
    file.write_str("metadata: this is a string, not a list\n").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn absolute_source_path_is_rejected() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("docpub.yaml");
    file.write_str("metadata:\n  - sourcePath: /etc/passwd\n    title: nope\n")
        .expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "got: {err}");
}

#[test]
fn duplicate_document_identity_is_rejected() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("docpub.yaml");
    file.write_str(
        "metadata:\n  - sourcePath: a.md\n    title: A\n  - sourcePath: b.md\n    title: B\n  - sourcePath: a.md\n    title: A\n",
    )
    .expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "got: {err}");
    assert!(err.to_string().contains("a.md (A)"), "got: {err}");
}

#[test]
fn same_path_with_another_title_is_a_distinct_document() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("docpub.yaml");
    file.write_str("metadata:\n  - sourcePath: a.md\n    title: A\n  - sourcePath: a.md\n    title: Other\n")
        .expect("write");

    let config = config::load_at(file.path()).expect("load");
    assert_eq!(config.metadata.len(), 2);
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn mid_write_crash_leaves_original_intact() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = config::config_path_in(dir.path());
    config::init_at(&path, RemoteConfig::default()).expect("init");
    let original_bytes = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = config::tmp_path_for(&path);
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    let current_bytes = fs::read(&path).expect("read after crash");
    assert_eq!(original_bytes, current_bytes, "original must be unchanged after crash");
    assert!(config::load_at(&path).is_ok(), "config must still load");
}

// ---------------------------------------------------------------------------
// 3. Init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_with_remote_settings() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = config::config_path_in(dir.path());
    let remote = RemoteConfig {
        adapter: "cms".to_string(),
        base_url: Some("https://community.example.com/api/core/v3".to_string()),
        ..RemoteConfig::default()
    };
    config::init_at(&path, remote).expect("init");

    dir.child("docpub.yaml").assert(predicate::path::exists());
    dir.child("docpub.yaml")
        .assert(predicate::str::contains("adapter: cms"));
    dir.child("docpub.yaml")
        .assert(predicate::str::contains("baseUrl: https://community.example.com/api/core/v3"));

    let loaded = config::load_at(&path).expect("load");
    assert_eq!(loaded.remote.adapter, "cms");
    assert_eq!(loaded.include, vec!["**/*.md".to_string()]);
}
