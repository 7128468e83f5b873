//! Error types for docpub-core.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors. These abort a run before any batch starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// The adapter label is not in the adapter registry.
    #[error("unknown remote adapter '{label}'; expected one of: {known}")]
    UnknownAdapter { label: String, known: String },

    /// The adapter needs credentials the config does not provide.
    #[error("remote adapter '{adapter}' requires credentials: set `token`, or `username` and `password`")]
    MissingCredentials { adapter: String },

    /// The adapter needs a base URL the config does not provide.
    #[error("remote adapter '{adapter}' requires `baseUrl`")]
    MissingBaseUrl { adapter: String },

    /// A value is present but unusable.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

/// Failure to compute a document's state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The source file is gone and the document is neither deleted nor
    /// marked for deletion, so there is no checksum to compare against.
    #[error("source file {path} is missing; mark the document for deletion or restore the file")]
    SourceMissing { path: PathBuf },
}
