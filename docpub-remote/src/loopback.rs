//! In-process transport for tests: answers every request with a closure and
//! records what was sent.

use std::sync::Mutex;

use crate::http::{HttpRequest, HttpResponse, Transport};

type Handler = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

pub struct LoopbackTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl LoopbackTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Requests with the given method whose path ends with `suffix`.
    pub fn requests_to(&self, method: crate::http::Method, suffix: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path().ends_with(suffix))
            .collect()
    }
}

impl Transport for LoopbackTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }
        Ok((self.handler)(request))
    }
}
