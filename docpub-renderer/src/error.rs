//! Error types for docpub-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while converting a document.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// The source file does not exist.
    #[error("source file {path} not found")]
    SourceMissing { path: PathBuf },

    /// Filesystem error reading the source, loading templates or writing the
    /// artifact.
    #[error("conversion io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConversionError {
    ConversionError::Io { path: path.into(), source }
}
