//! Typed access to one REST resource, including lazy paginated listing.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{HttpError, HttpErrorKind};
use crate::http::{HttpClient, HttpRequest, Method};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub items_per_page: Option<usize>,
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// Client bound to one resource path, with a fixed set of query parameters.
pub struct ResourceClient<T> {
    http: HttpClient,
    path: String,
    query: Vec<(String, String)>,
    page_size: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            path: self.path.clone(),
            query: self.query.clone(),
            page_size: self.page_size,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> ResourceClient<T> {
    pub fn new(http: HttpClient, path: &str) -> Self {
        Self {
            http,
            path: path.to_string(),
            query: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            _marker: PhantomData,
        }
    }

    /// Append a query parameter. Repeated keys are kept (`filter=a&filter=b`).
    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), id)
    }

    pub fn get(&self, id: &str) -> Result<T, HttpError> {
        self.http
            .execute(Method::Get, &self.item_path(id), &self.query, None)?
            .json()
    }

    pub fn post<B: Serialize>(&self, body: &B) -> Result<T, HttpError> {
        let payload = encode(Method::Post, &self.path, body)?;
        self.http
            .execute(Method::Post, &self.path, &self.query, Some(payload))?
            .json()
    }

    pub fn put<B: Serialize>(&self, id: &str, body: &B) -> Result<T, HttpError> {
        let path = self.item_path(id);
        let payload = encode(Method::Put, &path, body)?;
        self.http
            .execute(Method::Put, &path, &self.query, Some(payload))?
            .json()
    }

    pub fn delete(&self, id: &str) -> Result<(), HttpError> {
        self.http
            .execute(Method::Delete, &self.item_path(id), &self.query, None)
            .map(|_| ())
    }

    /// Lazily iterate every item of the listing, fetching pages on demand.
    pub fn paged(&self) -> PagedSequence<T> {
        PagedSequence {
            client: self.clone(),
            next: Some(NextPage::Index(0)),
            buffer: Vec::new().into_iter(),
            pages_fetched: 0,
        }
    }

    /// First item of the listing, fetching at most one page.
    pub fn first(&self) -> Result<Option<T>, HttpError> {
        self.paged().next().transpose()
    }

    fn fetch(&self, next: &NextPage) -> Result<Page<T>, HttpError> {
        let exchange = match next {
            NextPage::Index(start) => {
                let mut query = self.query.clone();
                query.push(("startIndex".to_string(), start.to_string()));
                query.push(("count".to_string(), self.page_size.to_string()));
                self.http.execute(Method::Get, &self.path, &query, None)?
            }
            NextPage::Link(url) => self.http.execute(Method::Get, url, &[], None)?,
        };
        exchange.json()
    }
}

fn encode<B: Serialize>(method: Method, path: &str, body: &B) -> Result<String, HttpError> {
    serde_json::to_string(body).map_err(|e| {
        HttpError::new(
            HttpRequest::new(method, path),
            None,
            HttpErrorKind::Encode(e.to_string()),
        )
    })
}

enum NextPage {
    Index(usize),
    Link(String),
}

/// Iterator over a paginated listing.
///
/// Pages are requested only when the buffered items run out. A page that is
/// empty, or shorter than the requested size without a `links.next`, ends the
/// sequence. When the server sends a `links` object, its `next` link is the
/// only continuation. A failed request is yielded once and the sequence then
/// stops.
pub struct PagedSequence<T> {
    client: ResourceClient<T>,
    next: Option<NextPage>,
    buffer: std::vec::IntoIter<T>,
    pages_fetched: usize,
}

impl<T> PagedSequence<T> {
    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

impl<T: DeserializeOwned> Iterator for PagedSequence<T> {
    type Item = Result<T, HttpError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(Ok(item));
            }
            let next = self.next.take()?;
            self.pages_fetched += 1;
            let page = match self.client.fetch(&next) {
                Ok(page) => page,
                Err(err) => return Some(Err(err)),
            };

            let received = page.list.len();
            if received == 0 {
                return None;
            }
            self.next = match page.links {
                Some(links) => links.next.map(NextPage::Link),
                None if received < self.client.page_size => None,
                None => {
                    let start = match next {
                        NextPage::Index(start) => start,
                        NextPage::Link(_) => page.start_index.unwrap_or(0),
                    };
                    Some(NextPage::Index(start + received))
                }
            };
            self.buffer = page.list.into_iter();
        }
    }
}
