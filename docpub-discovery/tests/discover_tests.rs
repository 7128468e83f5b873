//! Parameterised discovery tests for `docpub-discovery`.
//!
//! Each `#[case]` gets an isolated `TempDir`: no shared state.

use std::fs;
use std::path::PathBuf;

use docpub_discovery::{derive_title, discover, DiscoveryError};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn tree(files: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for rel in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(path, "# fixture\n").expect("write fixture");
    }
    dir
}

fn strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

fn paths(found: Vec<PathBuf>) -> Vec<String> {
    found.iter().map(|p| p.to_string_lossy().to_string()).collect()
}

const FILES: &[&str] = &[
    "README.md",
    "docs/guide.md",
    "docs/ops/runbook.md",
    "docs/drafts/wip.md",
    "docs/notes.txt",
    "target/docpub/README.md",
    ".git/HEAD.md",
    "node_modules/pkg/README.md",
];

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[rstest]
#[case(&["."], &["**/*.md"], &[], &["README.md", "docs/drafts/wip.md", "docs/guide.md", "docs/ops/runbook.md"])]
#[case(&["."], &["**/*.md"], &["docs/drafts/**"], &["README.md", "docs/guide.md", "docs/ops/runbook.md"])]
#[case(&["docs"], &["**/*.md"], &[], &["docs/drafts/wip.md", "docs/guide.md", "docs/ops/runbook.md"])]
#[case(&["."], &["docs/*.txt"], &[], &["docs/notes.txt"])]
#[case(&["docs", "docs/ops"], &["**/runbook.md"], &[], &["docs/ops/runbook.md"])]
#[case(&["."], &["*.rst"], &[], &[])]
fn discovery_patterns(
    #[case] roots: &[&str],
    #[case] include: &[&str],
    #[case] exclude: &[&str],
    #[case] expected: &[&str],
) {
    let dir = tree(FILES);
    let roots: Vec<PathBuf> = roots.iter().map(PathBuf::from).collect();
    let found = discover(dir.path(), &roots, &strings(include), &strings(exclude)).expect("discover");
    assert_eq!(paths(found), expected);
}

#[test]
fn missing_root_is_an_error() {
    let dir = tree(&["a.md"]);
    let err = discover(dir.path(), &[PathBuf::from("nope")], &strings(&["**/*.md"]), &[]).unwrap_err();
    assert!(matches!(err, DiscoveryError::RootMissing { .. }));
}

#[test]
fn bad_glob_is_reported_with_pattern() {
    let dir = tree(&["a.md"]);
    let err = discover(dir.path(), &[PathBuf::from(".")], &strings(&["docs/[.md"]), &[]).unwrap_err();
    match err {
        DiscoveryError::Pattern { pattern, .. } => assert_eq!(pattern, "docs/[.md"),
        other => panic!("unexpected error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

#[rstest]
#[case("intro.md", "# Getting Started\n\nWelcome.\n", "Getting Started")]
#[case("intro.md", "Some preamble\n\n# Later Heading\n", "Later Heading")]
#[case("release-notes.md", "no heading here\n", "release-notes")]
#[case("empty.md", "", "empty")]
fn title_derivation(#[case] name: &str, #[case] content: &str, #[case] expected: &str) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write");
    assert_eq!(derive_title(&path).expect("title"), expected);
}
