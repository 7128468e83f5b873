//! Error types for docpub-sync.

use std::path::PathBuf;

use thiserror::Error;

use docpub_core::{ConfigError, StateError};
use docpub_discovery::DiscoveryError;
use docpub_remote::RemoteError;
use docpub_renderer::ConversionError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration is unusable. Raised before any batch runs.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Seeding could not search the configured roots.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The document's state could not be computed.
    #[error("{0}")]
    State(#[from] StateError),

    /// Markdown → artifact conversion failed.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// A remote adapter call failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The tracked document disappeared from the config mid-run.
    #[error("document {0} is no longer tracked")]
    Untracked(String),

    /// Another record earlier in the config has the same identity.
    #[error("document {0} is tracked more than once")]
    Duplicate(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
