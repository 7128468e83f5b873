//! Page context: serializable rendering payload for one converted document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docpub_core::DocumentMetadata;

use crate::error::ConversionError;

/// Everything the page template can reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    pub title: String,
    pub source_path: String,
    pub tags: Vec<String>,
    /// Rendered HTML fragment of the markdown source.
    pub body: String,
    pub meta: MetaCtx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub version: String,
    pub generated_at: DateTime<Utc>,
}

impl PageContext {
    pub fn for_document(document: &DocumentMetadata, body: String) -> Self {
        PageContext {
            title: document.title.clone(),
            source_path: document.source_path.to_string_lossy().replace('\\', "/"),
            tags: document.tags.clone().unwrap_or_default(),
            body,
            meta: MetaCtx {
                version: env!("CARGO_PKG_VERSION").to_string(),
                generated_at: Utc::now(),
            },
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, ConversionError> {
        tera::Context::from_serialize(self).map_err(ConversionError::from)
    }
}
