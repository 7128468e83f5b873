//! docpub core library: domain types, config persistence, state resolution.
//!
//! - [`types`]: [`DocumentMetadata`], [`Config`] and friends
//! - [`state`]: [`state::resolve`], the per-document state decision
//! - [`checksum`]: content fingerprints
//! - [`config`]: load / save / init of `docpub.yaml`
//! - [`error`]: [`ConfigError`], [`StateError`]

pub mod checksum;
pub mod config;
pub mod error;
pub mod state;
pub mod timestamp;
pub mod types;

pub use error::{ConfigError, StateError};
pub use types::{
    props, Config, DocumentKey, DocumentMetadata, DocumentState, RemoteConfig, RemoteUpdate,
};
