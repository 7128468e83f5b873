//! Offline status check: what a sync would do, without touching the remote.

use serde::Serialize;

use docpub_core::checksum::checksum_file;
use docpub_core::{state, Config, DocumentMetadata, DocumentState};

use crate::context::SyncContext;

/// Resolved state of one tracked document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub source_path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<DocumentState>,
    #[serde(rename = "remoteURI", skip_serializing_if = "Option::is_none")]
    pub remote_uri: Option<String>,
    /// Why the state could not be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-state counts across a status report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub deleted: usize,
    pub current: usize,
    pub errors: usize,
}

impl StatusSummary {
    pub fn from_entries(entries: &[StatusEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.state {
                Some(DocumentState::Create) => summary.create += 1,
                Some(DocumentState::Update) => summary.update += 1,
                Some(DocumentState::Delete) => summary.delete += 1,
                Some(DocumentState::Deleted) => summary.deleted += 1,
                Some(DocumentState::Current) => summary.current += 1,
                None => summary.errors += 1,
            }
        }
        summary
    }

    /// Documents the next sync would send to the remote.
    pub fn pending(&self) -> usize {
        self.create + self.update + self.delete
    }
}

/// Resolve the state of every tracked document in `config`.
pub fn check(config: &Config, ctx: &SyncContext) -> Vec<StatusEntry> {
    config.metadata.iter().map(|doc| entry_for(doc, ctx)).collect()
}

fn entry_for(document: &DocumentMetadata, ctx: &SyncContext) -> StatusEntry {
    let source = ctx.source_path(document);
    let resolved = match checksum_file(&source) {
        Ok(current) => state::resolve(document, current).map_err(|e| e.to_string()),
        Err(e) => Err(format!("cannot read {}: {e}", source.display())),
    };
    let (state, error) = match resolved {
        Ok(state) => (Some(state), None),
        Err(message) => (None, Some(message)),
    };
    StatusEntry {
        source_path: document.source_path.to_string_lossy().replace('\\', "/"),
        title: document.title.clone(),
        state,
        remote_uri: document.remote_uri.clone(),
        error,
    }
}
