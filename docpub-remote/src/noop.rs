//! Adapter that performs no network I/O. Used for dry runs, local previews and
//! tests.

use chrono::Utc;

use docpub_core::{ConfigError, DocumentMetadata, RemoteConfig, RemoteUpdate};

use crate::error::RemoteError;
use crate::http::HttpRequest;
use crate::remote::{Publication, Remote, RemoteRecord};

pub const LABEL: &str = "noop";

#[derive(Debug, Clone, Default)]
pub struct NoopRemote {
    native_markdown: bool,
}

impl NoopRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            native_markdown: config.native_markdown,
        }
    }

    fn uri_for(document: &DocumentMetadata) -> String {
        format!("noop:{}", document.source_path.display())
    }
}

impl Remote for NoopRemote {
    fn label(&self) -> &str {
        LABEL
    }

    fn native_markdown(&self) -> bool {
        self.native_markdown
    }

    fn validate_config(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn authenticate(&self, request: HttpRequest) -> HttpRequest {
        request
    }

    fn find(&self, _document: &DocumentMetadata) -> Result<Option<RemoteRecord>, RemoteError> {
        Ok(None)
    }

    fn create(&self, publication: &Publication<'_>) -> Result<RemoteUpdate, RemoteError> {
        let now = Utc::now();
        Ok(RemoteUpdate {
            remote_uri: Some(Self::uri_for(publication.document)),
            created_on: Some(now),
            last_updated: Some(now),
            ..RemoteUpdate::default()
        })
    }

    fn update(&self, _publication: &Publication<'_>) -> Result<RemoteUpdate, RemoteError> {
        Ok(RemoteUpdate {
            last_updated: Some(Utc::now()),
            ..RemoteUpdate::default()
        })
    }

    fn delete(&self, _document: &DocumentMetadata) -> Result<RemoteUpdate, RemoteError> {
        Ok(RemoteUpdate::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{BodyFormat, DocumentBody};
    use std::collections::BTreeMap;

    #[test]
    fn create_assigns_a_local_uri() {
        let doc = DocumentMetadata::new("docs/guide.md", "Guide");
        let publication = Publication {
            document: &doc,
            body: DocumentBody {
                format: BodyFormat::Html,
                text: "<p>hi</p>".to_string(),
            },
            tags: Vec::new(),
            extra_props: BTreeMap::new(),
        };
        let update = NoopRemote::new().create(&publication).unwrap();
        assert_eq!(update.remote_uri.as_deref(), Some("noop:docs/guide.md"));
        assert!(update.created_on.is_some());
    }

    #[test]
    fn find_never_matches() {
        let doc = DocumentMetadata::new("a.md", "A");
        assert_eq!(NoopRemote::new().find(&doc).unwrap(), None);
    }
}
