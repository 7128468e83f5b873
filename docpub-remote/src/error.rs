//! Error types for docpub-remote.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// Why a single HTTP exchange failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpErrorKind {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("could not decode response body: {0}")]
    Decode(String),

    #[error("could not encode request body: {0}")]
    Encode(String),

    #[error("invalid URL: {0}")]
    Url(String),

    /// No transport is configured (misconfiguration, or a disabled client).
    #[error("no HTTP client available")]
    Unavailable,
}

/// Failure of one remote call.
///
/// Carries the originating request and, when one was received, the response.
#[derive(Debug)]
pub struct HttpError {
    pub request: HttpRequest,
    pub response: Option<HttpResponse>,
    pub kind: HttpErrorKind,
}

impl HttpError {
    pub fn new(request: HttpRequest, response: Option<HttpResponse>, kind: HttpErrorKind) -> Self {
        Self {
            request,
            response,
            kind,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            HttpErrorKind::Status(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} failed: {}", self.request.method, self.request.url, self.kind)?;
        if let Some(response) = &self.response {
            let snippet = response.body_snippet();
            if !snippet.is_empty() {
                write!(f, " ({snippet})")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Errors raised by a remote adapter operation.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Neither the tracking tag nor the stored remote URI identify the
    /// remote document, so it cannot be safely mutated.
    #[error("cannot resolve the remote content id for {path}: tracking tag '{tag}' matched nothing and remote URI {uri:?} carries no id")]
    UnresolvedContentId {
        path: PathBuf,
        tag: String,
        uri: Option<String>,
    },

    /// The remote answered successfully but without a field we need.
    #[error("remote response is missing {0}")]
    Protocol(String),
}
