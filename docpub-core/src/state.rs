//! Document state resolution.
//!
//! Precedence (first match wins):
//! 1. `deletedOn` present → `Deleted`
//! 2. `remoteURI` absent → `Create`
//! 3. delete marker in `extraProps` → `Delete`
//! 4. stored source checksum equals the current one → `Current`
//! 5. otherwise → `Update`

use crate::error::StateError;
use crate::types::{DocumentMetadata, DocumentState};

/// Resolve what the remote needs for `metadata`.
///
/// `current_checksum` is `None` when the source file no longer exists. Only
/// steps 4 and 5 need it; reaching them without one is
/// [`StateError::SourceMissing`].
pub fn resolve(
    metadata: &DocumentMetadata,
    current_checksum: Option<u64>,
) -> Result<DocumentState, StateError> {
    if metadata.deleted_on.is_some() {
        return Ok(DocumentState::Deleted);
    }
    if metadata.remote_uri.is_none() {
        return Ok(DocumentState::Create);
    }
    if metadata.is_marked_for_deletion() {
        return Ok(DocumentState::Delete);
    }

    let current = current_checksum.ok_or_else(|| StateError::SourceMissing {
        path: metadata.source_path.clone(),
    })?;
    if metadata.source_checksum == Some(current) {
        Ok(DocumentState::Current)
    } else {
        Ok(DocumentState::Update)
    }
}
