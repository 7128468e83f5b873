//! Per-run context: resolved paths plus the conversion cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use docpub_core::{Config, DocumentKey, DocumentMetadata};
use docpub_renderer::{ConversionError, Converter};

/// Runtime state for one sync run. Never persisted.
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Directory the config file lives in; source paths resolve against it.
    pub base_dir: PathBuf,
    /// Absolute search roots.
    pub roots: Vec<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Absolute artifact directory.
    pub output: PathBuf,
    conversions: HashMap<DocumentKey, PathBuf>,
}

impl SyncContext {
    pub fn new(base_dir: &Path, config: &Config) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            roots: config.roots.iter().map(|r| base_dir.join(r)).collect(),
            include: config.include.clone(),
            exclude: config.exclude.clone(),
            output: base_dir.join(&config.output),
            conversions: HashMap::new(),
        }
    }

    /// Absolute path of a document's source file.
    pub fn source_path(&self, document: &DocumentMetadata) -> PathBuf {
        self.base_dir.join(&document.source_path)
    }

    /// Artifact for `document`, converting it on first request this run.
    pub fn converted(
        &mut self,
        document: &DocumentMetadata,
        converter: &dyn Converter,
    ) -> Result<PathBuf, ConversionError> {
        let key = document.key();
        if let Some(path) = self.conversions.get(&key) {
            tracing::debug!(document = %key, "conversion cached");
            return Ok(path.clone());
        }
        let path = converter.convert(document)?;
        self.conversions.insert(key, path.clone());
        Ok(path)
    }
}
