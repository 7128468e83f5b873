//! Adapter for a REST content management service (`/api/core/v3` style).
//!
//! Documents live under `contents`, collections under `places`. Every
//! document written by this adapter carries a tracking tag derived from its
//! identity so it can be found again even when local bookkeeping is lost.

use std::collections::HashMap;
use std::cell::RefCell;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use docpub_core::{props, timestamp, ConfigError, DocumentMetadata, RemoteConfig, RemoteUpdate};

use crate::error::{HttpError, RemoteError};
use crate::http::{Auth, HttpClient, HttpRequest, Transport, UreqTransport};
use crate::remote::{Publication, Remote, RemoteRecord};
use crate::resource::ResourceClient;

pub const LABEL: &str = "cms";

const CONTENTS: &str = "contents";
const PLACES: &str = "places";
const TRACKING_TAG_PREFIX: &str = "docpub-";

/// Narrow place filters tried before falling back to full-text search.
const PLACE_FILTERS: [&str; 3] = [
    "relationship(member)",
    "relationship(following)",
    "relationship(owner)",
];

// ---------------------------------------------------------------------------
// Wire models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsContent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "contentID")]
    pub content_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub resources: Option<Resources>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub html: Option<ResourceRef>,
    #[serde(default, rename = "self")]
    pub self_ref: Option<ResourceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "ref")]
    pub href: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsPlace {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "placeID")]
    pub place_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resources: Option<Resources>,
}

impl CmsPlace {
    fn matches(&self, wanted: &str) -> bool {
        self.display_name.as_deref() == Some(wanted) || self.name.as_deref() == Some(wanted)
    }
}

#[derive(Debug, Serialize)]
struct ContentPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    subject: &'a str,
    content: BodyPayload<'a>,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

#[derive(Debug, Serialize)]
struct BodyPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPlace {
    id: String,
    uri: String,
}

enum Lookup {
    Found(RemoteRecord),
    Missing,
    Unidentifiable { tag: String },
}

// ---------------------------------------------------------------------------
// Tracking tag
// ---------------------------------------------------------------------------

/// The tracking tag of `document`: its stored `trackingTag`, or the tag
/// derived from its source path and title.
pub fn tracking_tag_for(document: &DocumentMetadata) -> String {
    if let Some(tag) = document.extra_prop(props::TRACKING_TAG) {
        return tag.to_string();
    }
    let mut hasher = Sha256::new();
    hasher.update(document.source_path.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(document.title.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{TRACKING_TAG_PREFIX}{}", &digest[..12])
}

/// Escape a term for the `search(...)` filter.
fn escape_search(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | ',' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Numeric id embedded in a content URI (`.../DOC-1234` or `.../contents/1234`).
fn id_from_uri(uri: &str) -> Option<String> {
    let parsed = Url::parse(uri).ok()?;
    let last = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let id = last.strip_prefix("DOC-").unwrap_or(last);
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// CmsRemote
// ---------------------------------------------------------------------------

pub struct CmsRemote {
    config: RemoteConfig,
    http: HttpClient,
    places: RefCell<HashMap<String, Option<ResolvedPlace>>>,
}

impl CmsRemote {
    /// Build with a `ureq` transport bounded by the configured timeout.
    pub fn from_config(config: &RemoteConfig) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout()));
        Self::with_transport(config, transport)
    }

    /// Build over an arbitrary transport. Without a base URL the client is
    /// unavailable and every call fails with an HTTP error.
    pub fn with_transport(config: &RemoteConfig, transport: Arc<dyn Transport>) -> Self {
        let http = match &config.base_url {
            Some(base) => HttpClient::new(transport, base.clone(), Auth::from_config(config)),
            None => HttpClient::unavailable(String::new()),
        };
        Self::new(config.clone(), http)
    }

    pub fn new(config: RemoteConfig, http: HttpClient) -> Self {
        Self {
            config,
            http,
            places: RefCell::new(HashMap::new()),
        }
    }

    fn contents(&self) -> ResourceClient<CmsContent> {
        self.http.resource(CONTENTS)
    }

    fn find_by_tag(&self, tag: &str) -> Result<Option<CmsContent>, HttpError> {
        self.contents()
            .with_query("filter", format!("tag({tag})"))
            .with_query("filter", "type(document)")
            .first()
    }

    fn get_content(&self, id: &str) -> Result<Option<CmsContent>, HttpError> {
        match self.contents().get(id) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Locate the remote document: stored content id, then tracking tag, then
    /// the id embedded in the remote URI.
    fn lookup(&self, document: &DocumentMetadata) -> Result<Lookup, RemoteError> {
        if let Some(id) = document.extra_prop(props::CONTENT_ID) {
            return self.lookup_id(id);
        }
        let tag = tracking_tag_for(document);
        if let Some(content) = self.find_by_tag(&tag)? {
            return Ok(Lookup::Found(to_record(content)?));
        }
        match document.remote_uri.as_deref().and_then(id_from_uri) {
            Some(id) => self.lookup_id(&id),
            None if document.remote_uri.is_none() => Ok(Lookup::Missing),
            None => Ok(Lookup::Unidentifiable { tag }),
        }
    }

    fn lookup_id(&self, id: &str) -> Result<Lookup, RemoteError> {
        match self.get_content(id)? {
            Some(content) => Ok(Lookup::Found(to_record(content)?)),
            None => Ok(Lookup::Missing),
        }
    }

    /// Content id for update: stored id, tracking tag search, then remote URI.
    fn resolve_content_id(&self, document: &DocumentMetadata) -> Result<String, RemoteError> {
        if let Some(id) = document.extra_prop(props::CONTENT_ID) {
            return Ok(id.to_string());
        }
        let tag = tracking_tag_for(document);
        if let Some(content) = self.find_by_tag(&tag)? {
            if let Some(id) = content.id {
                return Ok(id);
            }
        }
        document
            .remote_uri
            .as_deref()
            .and_then(id_from_uri)
            .ok_or_else(|| RemoteError::UnresolvedContentId {
                path: document.source_path.clone(),
                tag,
                uri: document.remote_uri.clone(),
            })
    }

    /// Translate a place name into its API id and URI, trying each narrow
    /// filter in turn and then full-text search. A match, or a miss where
    /// every query answered, is cached for the lifetime of the adapter; a miss
    /// with failed queries is retried for the next document.
    fn resolve_place(&self, name: &str, warnings: &mut Vec<String>) -> Option<ResolvedPlace> {
        let cached = self.places.borrow().get(name).cloned();
        let resolved = match cached {
            Some(hit) => hit,
            None => self.query_place(name),
        };
        if resolved.is_none() {
            let message = format!("place '{name}' not found; document will be unfiled");
            tracing::warn!("{message}");
            warnings.push(message);
        }
        resolved
    }

    fn query_place(&self, name: &str) -> Option<ResolvedPlace> {
        let search = format!("search({})", escape_search(name));
        let filters = PLACE_FILTERS.iter().map(|f| f.to_string()).chain([search]);
        let mut resolved = None;
        let mut failed = 0;
        for filter in filters {
            match self.match_place(&filter, name) {
                Ok(Some(place)) => {
                    tracing::debug!(place = name, filter = %filter, id = %place.id, "resolved place");
                    resolved = Some(place);
                    break;
                }
                Ok(None) => {}
                Err(err) => {
                    failed += 1;
                    tracing::warn!(place = name, filter = %filter, error = %err, "place query failed");
                }
            }
        }

        if resolved.is_some() || failed == 0 {
            self.places
                .borrow_mut()
                .insert(name.to_string(), resolved.clone());
        }
        resolved
    }

    fn match_place(&self, filter: &str, name: &str) -> Result<Option<ResolvedPlace>, HttpError> {
        let places: ResourceClient<CmsPlace> = self.http.resource(PLACES);
        for place in places.with_query("filter", filter).paged() {
            let place = place?;
            if !place.matches(name) {
                continue;
            }
            let Some(id) = place.place_id.clone().or_else(|| place.id.clone()) else {
                continue;
            };
            let uri = match place.resources.and_then(|r| r.self_ref) {
                Some(self_ref) => self_ref.href,
                None => match self.http.url_for(&format!("{PLACES}/{id}"), &[]) {
                    Ok(uri) => uri,
                    Err(_) => continue,
                },
            };
            return Ok(Some(ResolvedPlace { id, uri }));
        }
        Ok(None)
    }

    /// Parent URI for `publication` plus the props recording it.
    fn parent_for(
        &self,
        publication: &Publication<'_>,
        update: &mut RemoteUpdate,
    ) -> Option<String> {
        match publication.extra_prop(props::PLACE) {
            Some(name) => {
                let place = self.resolve_place(name, &mut update.warnings)?;
                update
                    .extra_props
                    .insert(props::PLACE_ID.to_string(), place.id);
                update
                    .extra_props
                    .insert(props::PARENT_URI.to_string(), place.uri.clone());
                Some(place.uri)
            }
            None => publication.extra_prop(props::PARENT_URI).map(str::to_string),
        }
    }

    fn payload<'a>(
        &self,
        publication: &'a Publication<'_>,
        tag: &str,
        parent: Option<String>,
    ) -> ContentPayload<'a> {
        let mut tags = publication.tags.clone();
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
        ContentPayload {
            kind: "document",
            subject: &publication.document.title,
            content: BodyPayload {
                kind: publication.body.format.mime(),
                text: &publication.body.text,
            },
            tags,
            parent,
        }
    }
}

fn to_record(content: CmsContent) -> Result<RemoteRecord, RemoteError> {
    let id = content
        .id
        .ok_or_else(|| RemoteError::Protocol("content `id`".to_string()))?;
    let uri = content
        .resources
        .and_then(|r| r.html.or(r.self_ref))
        .map(|r| r.href);
    Ok(RemoteRecord {
        id,
        uri,
        tags: content.tags,
        created_on: content.published.as_deref().and_then(|t| timestamp::parse(t).ok()),
        last_updated: content.updated.as_deref().and_then(|t| timestamp::parse(t).ok()),
    })
}

/// Fold a remote record into `update`, recording the content id and tag.
fn absorb(update: &mut RemoteUpdate, record: RemoteRecord, tag: &str) {
    update.remote_uri = record.uri.or(update.remote_uri.take());
    update.created_on = record.created_on.or(update.created_on);
    update.last_updated = record.last_updated.or(update.last_updated);
    update
        .extra_props
        .insert(props::CONTENT_ID.to_string(), record.id);
    update
        .extra_props
        .insert(props::TRACKING_TAG.to_string(), tag.to_string());
}

impl Remote for CmsRemote {
    fn label(&self) -> &str {
        LABEL
    }

    fn native_markdown(&self) -> bool {
        self.config.native_markdown
    }

    fn validate_config(&self) -> Result<(), ConfigError> {
        let base = self
            .config
            .base_url
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingBaseUrl {
                adapter: LABEL.to_string(),
            })?;
        Url::parse(base).map_err(|e| ConfigError::Invalid {
            field: "remote.baseUrl".to_string(),
            reason: e.to_string(),
        })?;
        let has_token = self.config.token.as_deref().is_some_and(|t| !t.is_empty());
        let has_basic = self.config.username.is_some() && self.config.password.is_some();
        if !has_token && !has_basic {
            return Err(ConfigError::MissingCredentials {
                adapter: LABEL.to_string(),
            });
        }
        Ok(())
    }

    fn authenticate(&self, request: HttpRequest) -> HttpRequest {
        self.http.auth().apply(request)
    }

    fn find(&self, document: &DocumentMetadata) -> Result<Option<RemoteRecord>, RemoteError> {
        match self.lookup(document)? {
            Lookup::Found(record) => Ok(Some(record)),
            Lookup::Missing | Lookup::Unidentifiable { .. } => Ok(None),
        }
    }

    fn create(&self, publication: &Publication<'_>) -> Result<RemoteUpdate, RemoteError> {
        let document = publication.document;
        let tag = tracking_tag_for(document);
        let mut update = RemoteUpdate::default();

        if let Some(existing) = self.find(document)? {
            tracing::info!(path = %document.source_path.display(), id = %existing.id, "document already exists remotely; adopting it");
            update
                .warnings
                .push(format!("remote document {} already existed; adopted without re-creating", existing.id));
            absorb(&mut update, existing, &tag);
            return Ok(update);
        }

        let parent = self.parent_for(publication, &mut update);
        let payload = self.payload(publication, &tag, parent);
        let created = self.contents().post(&payload)?;
        let record = to_record(created)?;
        tracing::info!(path = %document.source_path.display(), id = %record.id, "created remote document");
        absorb(&mut update, record, &tag);
        Ok(update)
    }

    fn update(&self, publication: &Publication<'_>) -> Result<RemoteUpdate, RemoteError> {
        let document = publication.document;
        let tag = tracking_tag_for(document);
        let id = self.resolve_content_id(document)?;
        let mut update = RemoteUpdate::default();

        let parent = self.parent_for(publication, &mut update);
        let payload = self.payload(publication, &tag, parent);
        let updated = self.contents().put(&id, &payload)?;
        let record = to_record(updated)?;
        tracing::info!(path = %document.source_path.display(), id = %record.id, "updated remote document");
        absorb(&mut update, record, &tag);
        Ok(update)
    }

    fn delete(&self, document: &DocumentMetadata) -> Result<RemoteUpdate, RemoteError> {
        let mut update = RemoteUpdate::default();
        let record = match self.lookup(document)? {
            Lookup::Found(record) => record,
            Lookup::Missing => {
                let message = format!("{} was already deleted remotely", document.source_path.display());
                tracing::warn!("{message}");
                update.warnings.push(message);
                return Ok(update);
            }
            Lookup::Unidentifiable { tag } => {
                return Err(RemoteError::UnresolvedContentId {
                    path: document.source_path.clone(),
                    tag,
                    uri: document.remote_uri.clone(),
                })
            }
        };

        match self.contents().delete(&record.id) {
            Ok(()) => {
                tracing::info!(path = %document.source_path.display(), id = %record.id, "deleted remote document");
            }
            Err(err) if err.is_not_found() => {
                let message = format!("{} was already deleted remotely", document.source_path.display());
                tracing::warn!("{message}");
                update.warnings.push(message);
            }
            Err(err) => return Err(err.into()),
        }
        Ok(update)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, Method};
    use crate::loopback::LoopbackTransport;
    use crate::remote::{BodyFormat, DocumentBody};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: &str = "https://cms.example.com/api/core/v3";

    fn config() -> RemoteConfig {
        RemoteConfig {
            adapter: LABEL.to_string(),
            base_url: Some(BASE.to_string()),
            token: Some("tok".to_string()),
            ..RemoteConfig::default()
        }
    }

    fn remote(transport: Arc<LoopbackTransport>) -> CmsRemote {
        CmsRemote::with_transport(&config(), transport)
    }

    fn empty_page() -> HttpResponse {
        HttpResponse::new(200, json!({ "itemsPerPage": 25, "startIndex": 0, "list": [] }).to_string())
    }

    fn page(list: serde_json::Value) -> HttpResponse {
        HttpResponse::new(200, json!({ "itemsPerPage": 25, "startIndex": 0, "list": list }).to_string())
    }

    fn place(id: &str, display_name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "placeID": id,
            "displayName": display_name,
            "resources": { "self": { "ref": format!("{BASE}/places/{id}") } }
        })
    }

    fn content(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "type": "document",
            "published": "2024-03-01T09:30:00.000+0000",
            "updated": "2024-03-02T09:30:00.000+0000",
            "resources": { "html": { "ref": format!("https://cms.example.com/docs/DOC-{id}") } }
        })
    }

    fn publish<'a>(doc: &'a DocumentMetadata, props: &[(&str, &str)]) -> Publication<'a> {
        Publication {
            document: doc,
            body: DocumentBody {
                format: BodyFormat::Html,
                text: "<p>hello</p>".to_string(),
            },
            tags: vec!["docs".to_string()],
            extra_props: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn tracking_tag_is_stable_and_prefixed() {
        let a = DocumentMetadata::new("docs/guide.md", "Guide");
        let b = DocumentMetadata::new("docs/guide.md", "Guide");
        let c = DocumentMetadata::new("docs/guide.md", "Other");
        assert_eq!(tracking_tag_for(&a), tracking_tag_for(&b));
        assert_ne!(tracking_tag_for(&a), tracking_tag_for(&c));
        assert!(tracking_tag_for(&a).starts_with("docpub-"));
        assert_eq!(tracking_tag_for(&a).len(), "docpub-".len() + 12);
    }

    #[test]
    fn id_is_taken_from_document_uri() {
        assert_eq!(id_from_uri("https://cms.example.com/docs/DOC-1234"), Some("1234".to_string()));
        assert_eq!(id_from_uri(&format!("{BASE}/contents/99")), Some("99".to_string()));
        assert_eq!(id_from_uri("https://cms.example.com/docs/welcome"), None);
    }

    #[test]
    fn search_terms_are_escaped() {
        assert_eq!(escape_search("R&D (West), Team"), "R&D \\(West\\)\\, Team");
    }

    #[test]
    fn place_resolution_falls_through_to_search() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            if req.method == Method::Post {
                return HttpResponse::new(201, content("500").to_string());
            }
            if req.path().ends_with("/contents") {
                return empty_page();
            }
            match req.query_param("filter").as_deref() {
                Some("relationship(member)") => page(json!([place("1", "Engineering Archive")])),
                Some("relationship(following)") => page(json!([place("2", "engineering")])),
                Some("relationship(owner)") => page(json!([])),
                Some("search(Engineering)") => page(json!([place("2", "Eng"), place("42", "Engineering")])),
                other => panic!("unexpected filter {other:?}"),
            }
        }));
        let doc = DocumentMetadata::new("docs/guide.md", "Guide");
        let update = remote(transport.clone())
            .create(&publish(&doc, &[(props::PLACE, "Engineering")]))
            .unwrap();

        assert_eq!(update.extra_props.get(props::PLACE_ID).map(String::as_str), Some("42"));
        assert_eq!(
            update.extra_props.get(props::PARENT_URI).cloned(),
            Some(format!("{BASE}/places/42"))
        );
        let posts = transport.requests_to(Method::Post, "/contents");
        assert_eq!(posts.len(), 1);
        let body: serde_json::Value = serde_json::from_str(posts[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["parent"], json!(format!("{BASE}/places/42")));
        assert_eq!(transport.requests_to(Method::Get, "/places").len(), 4);
        assert!(update.warnings.is_empty());
    }

    #[test]
    fn unmatched_place_is_a_warning_and_document_is_unfiled() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            if req.method == Method::Post {
                return HttpResponse::new(201, content("7").to_string());
            }
            empty_page()
        }));
        let doc = DocumentMetadata::new("docs/guide.md", "Guide");
        let update = remote(transport.clone())
            .create(&publish(&doc, &[(props::PLACE, "Nowhere")]))
            .unwrap();

        assert_eq!(update.warnings.len(), 1);
        assert!(update.warnings[0].contains("Nowhere"));
        assert!(!update.extra_props.contains_key(props::PLACE_ID));
        let posts = transport.requests_to(Method::Post, "/contents");
        let body: serde_json::Value = serde_json::from_str(posts[0].body.as_deref().unwrap()).unwrap();
        assert!(body.get("parent").is_none());
    }

    #[test]
    fn failing_place_query_moves_on_to_the_next() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            if req.method == Method::Post {
                return HttpResponse::new(201, content("7").to_string());
            }
            match req.query_param("filter").as_deref() {
                Some("relationship(member)") => HttpResponse::new(500, "oops"),
                Some("relationship(following)") => page(json!([place("9", "Ops")])),
                _ => empty_page(),
            }
        }));
        let doc = DocumentMetadata::new("ops.md", "Ops runbook");
        let update = remote(transport)
            .create(&publish(&doc, &[(props::PLACE, "Ops")]))
            .unwrap();
        assert_eq!(update.extra_props.get(props::PLACE_ID).map(String::as_str), Some("9"));
    }

    #[test]
    fn place_lookup_that_errored_is_retried_for_the_next_document() {
        let place_requests = Arc::new(AtomicUsize::new(0));
        let counter = place_requests.clone();
        let transport = Arc::new(LoopbackTransport::new(move |req| {
            if req.method == Method::Post {
                return HttpResponse::new(201, content("7").to_string());
            }
            if req.path().ends_with("/contents") {
                return empty_page();
            }
            if counter.fetch_add(1, Ordering::SeqCst) < 4 {
                return HttpResponse::new(503, "unavailable");
            }
            page(json!([place("9", "Ops")]))
        }));
        let adapter = remote(transport);

        let first = DocumentMetadata::new("a.md", "A");
        let update = adapter.create(&publish(&first, &[(props::PLACE, "Ops")])).unwrap();
        assert!(!update.extra_props.contains_key(props::PLACE_ID));
        assert_eq!(update.warnings.len(), 1);

        let second = DocumentMetadata::new("b.md", "B");
        let update = adapter.create(&publish(&second, &[(props::PLACE, "Ops")])).unwrap();
        assert_eq!(update.extra_props.get(props::PLACE_ID).map(String::as_str), Some("9"));
        assert_eq!(place_requests.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn definitive_place_miss_is_cached() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            if req.method == Method::Post {
                return HttpResponse::new(201, content("7").to_string());
            }
            empty_page()
        }));
        let adapter = remote(transport.clone());
        for (path, title) in [("a.md", "A"), ("b.md", "B")] {
            let doc = DocumentMetadata::new(path, title);
            let update = adapter.create(&publish(&doc, &[(props::PLACE, "Nowhere")])).unwrap();
            assert_eq!(update.warnings.len(), 1);
        }
        assert_eq!(transport.requests_to(Method::Get, "/places").len(), 4);
    }

    #[test]
    fn create_adopts_existing_document_found_by_tag() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            if req.method == Method::Get && req.path().ends_with("/contents") {
                return page(json!([content("321")]));
            }
            panic!("unexpected request {req:?}");
        }));
        let doc = DocumentMetadata::new("docs/guide.md", "Guide");
        let update = remote(transport.clone()).create(&publish(&doc, &[])).unwrap();

        assert!(transport.requests_to(Method::Post, "/contents").is_empty());
        assert_eq!(update.extra_props.get(props::CONTENT_ID).map(String::as_str), Some("321"));
        assert_eq!(update.remote_uri.as_deref(), Some("https://cms.example.com/docs/DOC-321"));
        assert_eq!(update.warnings.len(), 1);

        let search = &transport.requests()[0];
        assert_eq!(
            search.query_params("filter"),
            vec![format!("tag({})", tracking_tag_for(&doc)), "type(document)".to_string()]
        );
    }

    #[test]
    fn create_posts_tags_and_records_bookkeeping() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            if req.method == Method::Post {
                return HttpResponse::new(201, content("88").to_string());
            }
            empty_page()
        }));
        let doc = DocumentMetadata::new("docs/guide.md", "Guide");
        let update = remote(transport.clone()).create(&publish(&doc, &[])).unwrap();
        let tag = tracking_tag_for(&doc);

        let post = &transport.requests_to(Method::Post, "/contents")[0];
        assert_eq!(post.header_value("Authorization"), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_str(post.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["subject"], json!("Guide"));
        assert_eq!(body["content"]["type"], json!("text/html"));
        assert_eq!(body["tags"], json!(["docs", tag.clone()]));

        assert_eq!(update.extra_props.get(props::CONTENT_ID).map(String::as_str), Some("88"));
        assert_eq!(update.extra_props.get(props::TRACKING_TAG), Some(&tag));
        assert!(update.created_on.is_some());
    }

    #[test]
    fn update_uses_stored_content_id() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            assert_eq!(req.method, Method::Put);
            HttpResponse::new(200, content("55").to_string())
        }));
        let mut doc = DocumentMetadata::new("docs/guide.md", "Guide");
        doc.remote_uri = Some("https://cms.example.com/docs/DOC-55".to_string());
        doc.set_extra_prop(props::CONTENT_ID, "55");
        remote(transport.clone()).update(&publish(&doc, &[])).unwrap();
        assert_eq!(transport.requests_to(Method::Put, "/contents/55").len(), 1);
    }

    #[test]
    fn update_falls_back_to_id_in_remote_uri() {
        let transport = Arc::new(LoopbackTransport::new(|req| match req.method {
            Method::Get => empty_page(),
            _ => HttpResponse::new(200, content("1234").to_string()),
        }));
        let mut doc = DocumentMetadata::new("docs/guide.md", "Guide");
        doc.remote_uri = Some("https://cms.example.com/docs/DOC-1234".to_string());
        remote(transport.clone()).update(&publish(&doc, &[])).unwrap();
        assert_eq!(transport.requests_to(Method::Put, "/contents/1234").len(), 1);
    }

    #[test]
    fn update_without_any_identifier_fails() {
        let transport = Arc::new(LoopbackTransport::new(|_req| empty_page()));
        let mut doc = DocumentMetadata::new("docs/guide.md", "Guide");
        doc.remote_uri = Some("https://cms.example.com/docs/welcome".to_string());
        let err = remote(transport).update(&publish(&doc, &[])).unwrap_err();
        assert!(matches!(err, RemoteError::UnresolvedContentId { .. }));
    }

    #[test]
    fn delete_of_missing_document_is_a_warning() {
        let transport = Arc::new(LoopbackTransport::new(|req| {
            assert_eq!(req.method, Method::Get);
            HttpResponse::new(404, "{\"error\":{\"status\":404}}")
        }));
        let mut doc = DocumentMetadata::new("docs/guide.md", "Guide");
        doc.set_extra_prop(props::CONTENT_ID, "55");
        let update = remote(transport.clone()).delete(&doc).unwrap();
        assert_eq!(update.warnings.len(), 1);
        assert!(transport.requests_to(Method::Delete, "/contents/55").is_empty());
    }

    #[test]
    fn delete_returning_not_found_is_already_deleted() {
        let transport = Arc::new(LoopbackTransport::new(|req| match req.method {
            Method::Get => HttpResponse::new(200, content("55").to_string()),
            _ => HttpResponse::new(404, ""),
        }));
        let mut doc = DocumentMetadata::new("docs/guide.md", "Guide");
        doc.set_extra_prop(props::CONTENT_ID, "55");
        let update = remote(transport).delete(&doc).unwrap();
        assert_eq!(update.warnings.len(), 1);
    }

    #[test]
    fn delete_forbidden_is_a_real_error() {
        let transport = Arc::new(LoopbackTransport::new(|req| match req.method {
            Method::Get => HttpResponse::new(200, content("55").to_string()),
            _ => HttpResponse::new(403, "forbidden"),
        }));
        let mut doc = DocumentMetadata::new("docs/guide.md", "Guide");
        doc.set_extra_prop(props::CONTENT_ID, "55");
        let err = remote(transport).delete(&doc).unwrap_err();
        match err {
            RemoteError::Http(http) => assert_eq!(http.status(), Some(403)),
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[rstest::rstest]
    #[case(None, Some("tok"), None, None, false)]
    #[case(Some(BASE), None, Some("alice"), Some("secret"), true)]
    #[case(Some(BASE), None, Some("alice"), None, false)]
    #[case(Some("not a url"), Some("tok"), None, None, false)]
    fn config_validation(
        #[case] base_url: Option<&str>,
        #[case] token: Option<&str>,
        #[case] username: Option<&str>,
        #[case] password: Option<&str>,
        #[case] ok: bool,
    ) {
        let config = RemoteConfig {
            adapter: LABEL.to_string(),
            base_url: base_url.map(str::to_string),
            token: token.map(str::to_string),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            ..RemoteConfig::default()
        };
        let result = CmsRemote::from_config(&config).validate_config();
        assert_eq!(result.is_ok(), ok, "{result:?}");
    }
}
