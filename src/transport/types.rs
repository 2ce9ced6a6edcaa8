//! Transport port types
//!
//! Defines the surface through which requests consume a transport: submit a
//! prepared request with a completion callback, and cancel an in-flight
//! submission through the returned handle. Everything the core learns about
//! a response passes through these types.

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::StatusCode;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Callback invoked by a transport exactly once per submission, with either
/// the raw response or a transport-level failure.
pub type TransportCallback = Box<dyn FnOnce(Result<RawResponse, TransportFailure>) + Send>;

/// A low-level transport executing prepared requests.
///
/// The crate ships [`HttpTransport`](super::HttpTransport); any other
/// implementation can be substituted, including test doubles. A transport
/// must invoke the callback at most once, on a thread of its choosing, and
/// must stop delivery after the returned handle has been cancelled on a best
/// effort basis (late deliveries are suppressed by the request machinery).
pub trait Transport: Send + Sync + 'static {
    /// Start executing `request`, invoking `on_complete` with the outcome.
    ///
    /// Returns a handle through which the submission can be cancelled.
    fn submit(&self, request: super::PreparedRequest, on_complete: TransportCallback)
        -> CancelHandle;
}

/// Handle to one in-flight submission. Cancelling it is the transport port's
/// second primitive: the transport packages its own abort logic into the
/// handle it returns from [`Transport::submit`].
pub struct CancelHandle {
    cancel: Box<dyn FnOnce() + Send>,
}

impl CancelHandle {
    /// Create a handle wrapping the transport's abort logic.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Cancel the submission. Consumes the handle.
    pub fn cancel(self) {
        (self.cancel)();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

// ============================================================================
// Response Surface
// ============================================================================

/// Metadata describing a received response: the final URL after redirects,
/// the status code, and the response headers.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseMeta {
    /// Create response metadata.
    pub fn new(url: Url, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            url,
            status,
            headers,
        }
    }

    /// The URL the response was ultimately served from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The content length advertised by the `Content-Length` header.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }
}

/// A complete raw response as delivered by a transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response metadata.
    pub meta: ResponseMeta,
    /// The response body, possibly empty.
    pub body: Bytes,
}

// ============================================================================
// Transport Failures
// ============================================================================

/// Machine-readable classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    /// No network connectivity.
    Offline,
    /// The request timed out.
    Timeout,
    /// The server could not be reached.
    ConnectionFailed,
    /// Any other transport failure.
    Other,
}

/// A failure raised by the transport before a response was received.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    /// Failure classification.
    pub kind: TransportFailureKind,
    /// Human-readable description from the transport.
    pub message: String,
    /// The underlying error, when available.
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl TransportFailure {
    /// Create a failure without an underlying source error.
    pub fn new(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }
}
