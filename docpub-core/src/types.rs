//! Domain types for docpub.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml, with the
//! camelCase field names of the persisted config.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

// ---------------------------------------------------------------------------
// Extra-property keys
// ---------------------------------------------------------------------------

/// Keys of the `extraProps` bag and who owns them.
pub mod props {
    /// Deletion marker. Set by the user (`docpub delete`); any value other
    /// than `"false"` marks the document for remote deletion.
    pub const DELETE: &str = "delete";

    /// Human-facing name of the parent place. Set by the user or inherited
    /// from `remote.defaultExtraProps`; read by the CMS adapter.
    pub const PLACE: &str = "place";

    /// API id of the resolved parent place. Written by the CMS adapter.
    pub const PLACE_ID: &str = "placeId";

    /// API URI of the resolved parent place. Written by the CMS adapter.
    pub const PARENT_URI: &str = "parentUri";

    /// Remote content id. Written by the CMS adapter on create or lookup.
    pub const CONTENT_ID: &str = "contentId";

    /// Self-assigned tag stamped on the remote document at first write.
    /// Written by the CMS adapter.
    pub const TRACKING_TAG: &str = "trackingTag";
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable identity of a tracked document: source path plus title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey {
    pub source_path: PathBuf,
    pub title: String,
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.source_path.display(), self.title)
    }
}

// ---------------------------------------------------------------------------
// Document state
// ---------------------------------------------------------------------------

/// What the remote needs for a document on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    Create,
    Update,
    Delete,
    Deleted,
    Current,
}

impl DocumentState {
    /// `true` when the state requires a remote call.
    pub fn needs_remote(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentState::Create => write!(f, "create"),
            DocumentState::Update => write!(f, "update"),
            DocumentState::Delete => write!(f, "delete"),
            DocumentState::Deleted => write!(f, "deleted"),
            DocumentState::Current => write!(f, "current"),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentMetadata
// ---------------------------------------------------------------------------

/// One tracked document.
///
/// Equality and hashing only consider `source_path` and `title`; every other
/// field is mutable sync state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub source_path: PathBuf,
    pub title: String,
    #[serde(rename = "remoteURI", default, skip_serializing_if = "Option::is_none")]
    pub remote_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_checksum: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_checksum: Option<u64>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub deleted_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_props: Option<BTreeMap<String, String>>,
}

impl DocumentMetadata {
    /// A freshly discovered document with no sync state.
    pub fn new(source_path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            title: title.into(),
            remote_uri: None,
            tags: None,
            source_checksum: None,
            converted_checksum: None,
            created_on: None,
            last_updated: None,
            deleted_on: None,
            extra_props: None,
        }
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            source_path: self.source_path.clone(),
            title: self.title.clone(),
        }
    }

    pub fn extra_prop(&self, key: &str) -> Option<&str> {
        self.extra_props
            .as_ref()
            .and_then(|props| props.get(key))
            .map(String::as_str)
    }

    pub fn set_extra_prop(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_props
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }

    /// `true` when `extraProps` carries a deletion marker.
    pub fn is_marked_for_deletion(&self) -> bool {
        self.extra_prop(props::DELETE)
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
    }

    /// Merge fields returned by a remote call into this record.
    pub fn merge(&mut self, update: &RemoteUpdate) {
        if let Some(uri) = &update.remote_uri {
            self.remote_uri = Some(uri.clone());
        }
        if let Some(created) = update.created_on {
            self.created_on = Some(created);
        }
        if let Some(updated) = update.last_updated {
            self.last_updated = Some(updated);
        }
        for (key, value) in &update.extra_props {
            self.set_extra_prop(key.clone(), value.clone());
        }
    }
}

impl PartialEq for DocumentMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.source_path == other.source_path && self.title == other.title
    }
}

impl Eq for DocumentMetadata {}

impl Hash for DocumentMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_path.hash(state);
        self.title.hash(state);
    }
}

/// Fields a remote call hands back for merging into the tracked record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteUpdate {
    pub remote_uri: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub extra_props: BTreeMap<String, String>,
    /// Recoverable conditions hit during the call (not merged).
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Remote service settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    /// Adapter label, resolved through the adapter registry.
    #[serde(default = "default_adapter")]
    pub adapter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-call connect/read/write timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub native_markdown: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_extra_props: BTreeMap<String, String>,
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn default_adapter() -> String {
    "noop".to_string()
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            adapter: default_adapter(),
            base_url: None,
            username: None,
            password: None,
            token: None,
            timeout: None,
            native_markdown: false,
            default_tags: Vec::new(),
            default_extra_props: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("adapter", &self.adapter)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("native_markdown", &self.native_markdown)
            .field("default_tags", &self.default_tags)
            .field("default_extra_props", &self.default_extra_props)
            .finish()
    }
}

/// Root of the persisted `docpub.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_tags: Vec<String>,
    /// Search roots, relative to the config file's directory.
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Directory converted artifacts are written to.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub metadata: Vec<DocumentMetadata>,
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_include() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

fn default_output() -> PathBuf {
    PathBuf::from("target/docpub")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            default_tags: Vec::new(),
            roots: default_roots(),
            include: default_include(),
            exclude: Vec::new(),
            output: default_output(),
            metadata: Vec::new(),
        }
    }
}

impl Config {
    /// Tracked document with the given source path, if any.
    pub fn find_by_path(&self, source_path: &Path) -> Option<&DocumentMetadata> {
        self.metadata.iter().find(|m| m.source_path == source_path)
    }

    pub fn find_by_path_mut(&mut self, source_path: &Path) -> Option<&mut DocumentMetadata> {
        self.metadata
            .iter_mut()
            .find(|m| m.source_path == source_path)
    }

    /// Tags every document publishes with: remote defaults, top-level
    /// defaults, then the document's own, in order and without duplicates.
    pub fn effective_tags(&self, document: &DocumentMetadata) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        let own = document.tags.iter().flatten();
        for tag in self.remote.default_tags.iter().chain(&self.default_tags).chain(own) {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }

    /// `remote.defaultExtraProps` overlaid by the document's own properties.
    pub fn effective_extra_props(&self, document: &DocumentMetadata) -> BTreeMap<String, String> {
        let mut merged = self.remote.default_extra_props.clone();
        if let Some(own) = &document.extra_props {
            merged.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
