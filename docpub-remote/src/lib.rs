//! docpub remote library: HTTP plumbing, paginated resources and adapters.
//!
//! - [`http`]: [`HttpClient`], [`Transport`], auth
//! - [`resource`]: [`ResourceClient`] and the lazy [`PagedSequence`]
//! - [`remote`]: the [`Remote`] capability contract
//! - [`noop`], [`cms`]: built-in adapters
//! - [`registry`]: [`AdapterRegistry`], label → adapter
//! - [`loopback`]: in-memory transport for tests

pub mod cms;
pub mod error;
pub mod http;
pub mod loopback;
pub mod noop;
pub mod registry;
pub mod remote;
pub mod resource;

pub use error::{HttpError, HttpErrorKind, RemoteError};
pub use http::{Auth, HttpClient, HttpRequest, HttpResponse, Method, Transport, UreqTransport};
pub use loopback::LoopbackTransport;
pub use registry::AdapterRegistry;
pub use remote::{BodyFormat, DocumentBody, Publication, Remote, RemoteRecord};
pub use resource::{Page, PagedSequence, ResourceClient};
