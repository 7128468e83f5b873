//! Shared HTTP plumbing used by every adapter through composition.
//!
//! The wire is abstracted behind [`Transport`] so adapters can be driven by
//! [`UreqTransport`] in production and by
//! [`LoopbackTransport`](crate::loopback::LoopbackTransport) in tests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde::de::DeserializeOwned;
use url::Url;

use docpub_core::RemoteConfig;

use crate::error::{HttpError, HttpErrorKind};
use crate::resource::ResourceClient;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request. `Debug` redacts the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any existing value (names are case-insensitive).
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Value of the first query parameter named `key`, percent-decoded.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query_params(key).into_iter().next()
    }

    /// All values of the query parameter named `key`, percent-decoded.
    pub fn query_params(&self, key: &str) -> Vec<String> {
        Url::parse(&self.url)
            .map(|url| {
                url.query_pairs()
                    .filter(|(k, _)| k == key)
                    .map(|(_, v)| v.into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// URL path without the query string.
    pub fn path(&self) -> String {
        Url::parse(&self.url)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| self.url.clone())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(n, v)| {
                if n.eq_ignore_ascii_case("authorization") {
                    (n.as_str(), "<redacted>")
                } else {
                    (n.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First line of the body, truncated, for error messages.
    pub fn body_snippet(&self) -> String {
        let line = self.body.lines().next().unwrap_or("").trim();
        if line.chars().count() > 120 {
            let cut: String = line.chars().take(120).collect();
            format!("{cut}…")
        } else {
            line.to_string()
        }
    }
}

/// A completed request/response pair.
#[derive(Debug)]
pub struct Exchange {
    pub request: HttpRequest,
    pub response: HttpResponse,
}

impl Exchange {
    /// Decode the response body as JSON.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = strip_json_guard(&self.response.body);
        match serde_json::from_str(body) {
            Ok(value) => Ok(value),
            Err(e) => Err(HttpError::new(
                self.request,
                Some(self.response),
                HttpErrorKind::Decode(e.to_string()),
            )),
        }
    }
}

/// Drop a leading `throw '...';` guard some CMS products prepend to JSON.
pub fn strip_json_guard(body: &str) -> &str {
    let trimmed = body.trim_start();
    if trimmed.starts_with("throw") {
        if let Some(end) = trimmed.find(';') {
            return trimmed[end + 1..].trim_start();
        }
    }
    trimmed
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Sends one request and returns whatever the server answered.
///
/// Non-2xx responses are returned as `Ok`; only failures to complete the
/// exchange (DNS, connect, timeout, broken body) are `Err`.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, String>;
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds each of connect, read and write.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        let result = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => return Err(err.to_string()),
        };
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| format!("failed to read response body: {e}"))?;
        Ok(HttpResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Credentials attached to every request as an `Authorization` header.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    None,
    Bearer(String),
    Basic {
        username: String,
        password: String,
    },
}

impl Auth {
    /// Bearer token when `token` is set, otherwise basic credentials.
    pub fn from_config(config: &RemoteConfig) -> Self {
        if let Some(token) = &config.token {
            return Auth::Bearer(token.clone());
        }
        match (&config.username, &config.password) {
            (Some(username), Some(password)) => Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => Auth::None,
        }
    }

    pub fn apply(&self, request: HttpRequest) -> HttpRequest {
        match self {
            Auth::None => request,
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {token}")),
            Auth::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                request.header("Authorization", format!("Basic {encoded}"))
            }
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => write!(f, "Auth::None"),
            Auth::Bearer(_) => write!(f, "Auth::Bearer(<redacted>)"),
            Auth::Basic { username, .. } => write!(f, "Auth::Basic({username}, <redacted>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

/// Base URL + credentials + transport. Cheap to clone.
///
/// A client built with [`HttpClient::unavailable`] has no transport; every
/// call fails with [`HttpErrorKind::Unavailable`], the same error shape as
/// any other HTTP failure.
#[derive(Clone)]
pub struct HttpClient {
    transport: Option<Arc<dyn Transport>>,
    base_url: String,
    auth: Auth,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, auth: Auth) -> Self {
        Self {
            transport: Some(transport),
            base_url: base_url.into(),
            auth,
        }
    }

    pub fn unavailable(base_url: impl Into<String>) -> Self {
        Self {
            transport: None,
            base_url: base_url.into(),
            auth: Auth::None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// A typed client bound to `path` under the base URL.
    pub fn resource<T: DeserializeOwned>(&self, path: &str) -> ResourceClient<T> {
        ResourceClient::new(self.clone(), path)
    }

    /// Absolute URL for `path` (or `path` itself when already absolute).
    ///
    /// An absolute `path` must share the base URL's scheme, host and port;
    /// credentials are never sent to another origin.
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<String, String> {
        let joined = if path.starts_with("http://") || path.starts_with("https://") {
            self.check_origin(path)?;
            path.to_string()
        } else if path.is_empty() {
            self.base_url.clone()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };
        let mut url = Url::parse(&joined).map_err(|e| format!("{joined}: {e}"))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    fn check_origin(&self, absolute: &str) -> Result<(), String> {
        let base = Url::parse(&self.base_url).map_err(|e| format!("{}: {e}", self.base_url))?;
        let target = Url::parse(absolute).map_err(|e| format!("{absolute}: {e}"))?;
        if base.origin() == target.origin() {
            Ok(())
        } else {
            Err(format!(
                "{absolute}: refusing to follow a link outside {}",
                base.origin().ascii_serialization()
            ))
        }
    }

    /// Send one request. Any non-2xx status is an [`HttpError`].
    pub fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<String>,
    ) -> Result<Exchange, HttpError> {
        let url = self.url_for(path, query).map_err(|reason| {
            HttpError::new(HttpRequest::new(method, path), None, HttpErrorKind::Url(reason))
        })?;
        let mut request = HttpRequest::new(method, url).header("Accept", "application/json");
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .with_body(body);
        }
        let request = self.auth.apply(request);

        let Some(transport) = &self.transport else {
            return Err(HttpError::new(request, None, HttpErrorKind::Unavailable));
        };

        tracing::debug!(method = %method, url = %request.url, "sending request");
        match transport.send(&request) {
            Ok(response) if response.is_success() => Ok(Exchange { request, response }),
            Ok(response) => {
                let status = response.status;
                Err(HttpError::new(request, Some(response), HttpErrorKind::Status(status)))
            }
            Err(reason) => Err(HttpError::new(request, None, HttpErrorKind::Transport(reason))),
        }
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("available", &self.transport.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
