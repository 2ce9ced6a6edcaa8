//! Error types for fetchkit
//!
//! This module defines the closed error taxonomy surfaced through completion
//! callbacks. Errors are always delivered as values, never thrown across the
//! request or queue boundary, and they are `Clone` so a completion callback
//! can hand its error to a `RequestQueue` for aggregation.

use crate::transport::TransportFailureKind;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Boxed error type accepted from response parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type delivered to completion and state-change callbacks.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The transport failed before a response was received (connectivity,
    /// timeout, DNS, ...). The kind and source are preserved for programmatic
    /// matching even when the message has been remapped to a friendlier one.
    #[error("{message}")]
    Transport {
        kind: TransportFailureKind,
        message: String,
        #[source]
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    /// The response was served from a different host than the one requested,
    /// which usually indicates an interstitial redirect (e.g. a captive
    /// portal login page).
    #[error("redirected to {url}")]
    Redirect { url: Url },

    /// The server answered with an error status code.
    #[error("HTTP error {status}")]
    HttpStatus { status: u16 },

    /// The response bytes could not be parsed into the expected value.
    #[error("invalid response data: {message}")]
    InvalidData { message: String },

    /// The request was cancelled. Only surfaced when the
    /// cancellation-errors option is enabled.
    #[error("the request was cancelled")]
    Cancelled,

    /// Several errors were reported to a queue during one running episode.
    #[error("{} errors occurred", .errors.len())]
    Multiple { errors: Vec<Error> },
}

impl Error {
    /// Create a transport error from a failure delivered by the transport.
    pub fn transport(
        kind: TransportFailureKind,
        message: impl Into<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
            source,
        }
    }

    /// Create a redirect error carrying the redirection target.
    pub fn redirect(url: Url) -> Self {
        Self::Redirect { url }
    }

    /// Create an HTTP status error.
    pub fn http_status(status: u16) -> Self {
        Self::HttpStatus { status }
    }

    /// Create an invalid-data error from a parser failure.
    pub fn invalid_data(source: impl std::fmt::Display) -> Self {
        Self::InvalidData {
            message: source.to_string(),
        }
    }

    /// Collapse the errors reported during one queue episode.
    ///
    /// No error yields `None`, a single error is passed through unchanged,
    /// and two or more are wrapped into `Error::Multiple`.
    pub fn aggregate(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Multiple { errors }),
        }
    }

    /// The HTTP status code, for `HttpStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// The errors wrapped by a `Multiple` error.
    pub fn underlying_errors(&self) -> Option<&[Error]> {
        match self {
            Self::Multiple { errors } => Some(errors),
            _ => None,
        }
    }
}
