//! Document discovery for `docpub-discovery`.
//!
//! `discover(base, roots, include, exclude)` walks each search root and
//! returns every file whose path (relative to `base`) matches an include glob
//! and no exclude glob. `derive_title(path)` picks a display title for a newly
//! discovered document.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;
use walkdir::WalkDir;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Directories never searched, whatever the configured excludes say.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/.git/**", "**/target/**", "**/node_modules/**"];

/// Errors from discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("search root {path} does not exist")]
    RootMissing { path: PathBuf },

    #[error("failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DiscoveryError {
    DiscoveryError::Io {
        path: path.into(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find candidate documents under `roots` (relative to `base`).
///
/// Returned paths are relative to `base`, use `/` separators, are sorted and
/// contain no duplicates even when roots overlap.
pub fn discover(
    base: &Path,
    roots: &[PathBuf],
    include: &[String],
    exclude: &[String],
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let include_set = build_globset(include)?;
    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect();
    excludes.extend(exclude.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut found = BTreeSet::new();
    for root in roots {
        let root_dir = base.join(root);
        if !root_dir.is_dir() {
            return Err(DiscoveryError::RootMissing { path: root_dir });
        }
        for entry in WalkDir::new(&root_dir) {
            let entry = entry.map_err(|e| DiscoveryError::Walk {
                path: root_dir.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(base).unwrap_or(path);
            let rel_str = normalize(relative);

            if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
                continue;
            }
            found.insert(PathBuf::from(rel_str));
        }
    }
    Ok(found.into_iter().collect())
}

/// Title for the markdown file at `path`: its first level-one heading, or the
/// file stem when there is none.
pub fn derive_title(path: &Path) -> Result<String, DiscoveryError> {
    let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(title_from_markdown(&text).unwrap_or(stem))
}

/// First `# ` heading of `markdown`, outside fenced code blocks.
pub fn title_from_markdown(markdown: &str) -> Option<String> {
    let mut in_fence = false;
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(heading) = trimmed.strip_prefix("# ") {
            let title = heading.trim().trim_end_matches('#').trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    text.strip_prefix("./").map(str::to_string).unwrap_or(text)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, DiscoveryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| DiscoveryError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| DiscoveryError::Pattern {
        pattern: patterns.join(", "),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_inside_code_fence_is_ignored() {
        let md = "```\n# not a title\n```\n\n# Real Title\n";
        assert_eq!(title_from_markdown(md), Some("Real Title".to_string()));
    }

    #[test]
    fn closing_hashes_are_dropped() {
        assert_eq!(title_from_markdown("# Guide ##\n"), Some("Guide".to_string()));
    }

    #[test]
    fn second_level_heading_is_not_a_title() {
        assert_eq!(title_from_markdown("## Section\ntext\n"), None);
    }
}
