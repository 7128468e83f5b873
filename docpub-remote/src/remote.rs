//! The remote capability contract every adapter implements.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use docpub_core::{ConfigError, DocumentMetadata, RemoteUpdate};

use crate::error::RemoteError;
use crate::http::HttpRequest;

/// Format of the body handed to an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Html,
    Markdown,
}

impl BodyFormat {
    pub fn mime(self) -> &'static str {
        match self {
            BodyFormat::Html => "text/html",
            BodyFormat::Markdown => "text/markdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBody {
    pub format: BodyFormat,
    pub text: String,
}

/// Everything an adapter needs to write one document.
///
/// `tags` and `extra_props` are already merged with the configured defaults.
#[derive(Debug, Clone)]
pub struct Publication<'a> {
    pub document: &'a DocumentMetadata,
    pub body: DocumentBody,
    pub tags: Vec<String>,
    pub extra_props: BTreeMap<String, String>,
}

impl Publication<'_> {
    pub fn extra_prop(&self, key: &str) -> Option<&str> {
        self.extra_props.get(key).map(String::as_str)
    }
}

/// A document as the remote currently knows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRecord {
    pub id: String,
    pub uri: Option<String>,
    pub tags: Vec<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A remote content service.
///
/// Adapters never mutate tracked state. Every write returns a
/// [`RemoteUpdate`] for the caller to merge.
pub trait Remote {
    /// Registry label of this adapter.
    fn label(&self) -> &str;

    /// `true` when the remote renders markdown itself and the conversion step
    /// can be skipped.
    fn native_markdown(&self) -> bool;

    fn validate_config(&self) -> Result<(), ConfigError>;

    /// Attach credentials to an outgoing request.
    fn authenticate(&self, request: HttpRequest) -> HttpRequest;

    fn find(&self, document: &DocumentMetadata) -> Result<Option<RemoteRecord>, RemoteError>;

    fn create(&self, publication: &Publication<'_>) -> Result<RemoteUpdate, RemoteError>;

    fn update(&self, publication: &Publication<'_>) -> Result<RemoteUpdate, RemoteError>;

    fn delete(&self, document: &DocumentMetadata) -> Result<RemoteUpdate, RemoteError>;
}
