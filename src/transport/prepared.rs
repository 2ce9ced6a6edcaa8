//! Prepared request descriptor
//!
//! An immutable, fully-formed description of one network call, ready for
//! submission to a transport. Sizers and paginators derive new descriptors
//! from existing ones, so the type carries query-string editing helpers.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

/// Immutable description of one network call: target, method, headers, body.
///
/// Builder-style combinators return a new value each time; an existing
/// descriptor is never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl PreparedRequest {
    /// Create a request with the given method and URL.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request.
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set or replace a query parameter, leaving the remaining ones in place.
    ///
    /// This is the primitive page sizers and paginators typically use to
    /// derive the descriptor for another page from an existing one.
    #[must_use]
    pub fn with_query_param(mut self, key: &str, value: &str) -> Self {
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(name, _)| name != key)
            .map(|(name, val)| (name.into_owned(), val.into_owned()))
            .collect();

        {
            let mut serializer = self.url.query_pairs_mut();
            serializer.clear();
            for (name, val) in &pairs {
                serializer.append_pair(name, val);
            }
            serializer.append_pair(key, value);
        }
        self
    }

    /// The value of a query parameter, if present.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body, if any.
    pub fn request_body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
