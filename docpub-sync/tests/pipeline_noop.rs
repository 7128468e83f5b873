use std::fs;
use std::path::{Path, PathBuf};

use docpub_core::{config, ConfigError, DocumentState, RemoteConfig};
use docpub_remote::AdapterRegistry;
use docpub_sync::{pipeline, RunOptions, SyncError, SyncOptions, SyncReport};
use tempfile::TempDir;

fn workspace() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("docs")).unwrap();
    fs::write(tmp.path().join("docs/guide.md"), "# User Guide\n\nHello.\n").unwrap();
    fs::write(tmp.path().join("notes.md"), "plain notes\n").unwrap();
    fs::create_dir_all(tmp.path().join("node_modules/pkg")).unwrap();
    fs::write(tmp.path().join("node_modules/pkg/README.md"), "ignored").unwrap();

    let path = config::config_path_in(tmp.path());
    config::init_at(&path, RemoteConfig::default()).unwrap();
    (tmp, path)
}

fn run(path: &Path, options: RunOptions) -> SyncReport {
    pipeline::run(path, &AdapterRegistry::with_builtins(), &options).unwrap()
}

#[test]
fn first_run_publishes_discovered_documents() {
    let (tmp, path) = workspace();

    let report = run(&path, RunOptions::default());
    assert!(report.is_success());
    assert_eq!(report.total, 2);

    let saved = config::load_at(&path).unwrap();
    let guide = saved.find_by_path(Path::new("docs/guide.md")).unwrap();
    assert_eq!(guide.title, "User Guide");
    assert_eq!(guide.remote_uri.as_deref(), Some("noop:docs/guide.md"));
    assert!(guide.created_on.is_some());
    assert!(tmp.path().join("target/docpub/docs/guide.md.html").exists());
    assert!(saved.find_by_path(Path::new("notes.md")).is_some());
}

#[test]
fn unchanged_workspace_is_current_on_rerun() {
    let (_tmp, path) = workspace();
    run(&path, RunOptions::default());

    let report = run(&path, RunOptions::default());
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.state == DocumentState::Current));
}

#[test]
fn edited_source_shows_as_update() {
    let (tmp, path) = workspace();
    run(&path, RunOptions::default());
    fs::write(tmp.path().join("notes.md"), "edited notes\n").unwrap();

    let entries = pipeline::status(&path).unwrap();
    let notes = entries.iter().find(|e| e.source_path == "notes.md").unwrap();
    assert_eq!(notes.state, Some(DocumentState::Update));
}

#[test]
fn dry_run_leaves_config_untouched() {
    let (_tmp, path) = workspace();
    let before = fs::read_to_string(&path).unwrap();

    let options = RunOptions {
        sync: SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        },
        ..RunOptions::default()
    };
    let report = run(&path, options);
    assert_eq!(report.total, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn marked_document_is_deleted_once() {
    let (tmp, path) = workspace();
    run(&path, RunOptions::default());
    assert!(pipeline::mark_for_deletion(&path, Path::new("notes.md")).unwrap());
    fs::remove_file(tmp.path().join("notes.md")).unwrap();

    let report = run(&path, RunOptions::default());
    assert!(report.is_success());
    let saved = config::load_at(&path).unwrap();
    assert!(saved
        .find_by_path(Path::new("notes.md"))
        .unwrap()
        .deleted_on
        .is_some());

    let again = run(&path, RunOptions::default());
    let notes = again
        .outcomes
        .iter()
        .find(|o| o.source_path == Path::new("notes.md"))
        .unwrap();
    assert_eq!(notes.state, DocumentState::Deleted);
}

#[test]
fn marking_an_untracked_path_reports_false() {
    let (_tmp, path) = workspace();
    assert!(!pipeline::mark_for_deletion(&path, Path::new("missing.md")).unwrap());
}

#[test]
fn unknown_adapter_fails_before_any_document() {
    let (_tmp, path) = workspace();
    let mut cfg = config::load_at(&path).unwrap();
    cfg.remote.adapter = "carrier-pigeon".to_string();
    config::save_at(&path, &cfg).unwrap();

    let err = pipeline::run(&path, &AdapterRegistry::with_builtins(), &RunOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Config(ConfigError::UnknownAdapter { .. })
    ));
    assert!(config::load_at(&path).unwrap().metadata.is_empty());
}
