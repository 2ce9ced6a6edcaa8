//! # fetchkit
//!
//! Cancellable request lifecycle, pagination, and request grouping for HTTP
//! clients.
//!
//! ## Features
//!
//! - **Request lifecycle**: resume/cancel/is-running state machine with
//!   at-most-once completion delivery per run, response classification, and
//!   pluggable response parsing
//! - **Pagination**: chain pages of a list endpoint through an opaque
//!   [`Page`] cursor, with caller-supplied sizer and paginator functions
//! - **Request queues**: aggregate any number of requests into one
//!   running/finished signal with error collection
//! - **Transport port**: the network is consumed through the [`Transport`]
//!   trait; a reqwest-backed [`HttpTransport`] ships with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fetchkit::{HttpTransport, PreparedRequest, Request, RequestOptions};
//! use std::sync::Arc;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = Arc::new(HttpTransport::new());
//!     let url = Url::parse("https://api.example.com/videos").unwrap();
//!
//!     let request = Request::json_array(
//!         transport,
//!         PreparedRequest::get(url),
//!         RequestOptions::new(),
//!         |videos, _response, error| match (videos, error) {
//!             (Some(videos), _) => println!("received {} videos", videos.len()),
//!             (_, Some(error)) => eprintln!("request failed: {error}"),
//!             _ => unreachable!(),
//!         },
//!     );
//!
//!     // A resumed request keeps itself alive until it completes.
//!     request.resume();
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ RequestQueue        running/finished signal, error episodes │
//! └───────────────┬─────────────────────────────────────────────┘
//!                 │ observes (weak)
//! ┌───────────────┴─────────────────────────────────────────────┐
//! │ Request<T> / FirstPageRequest<T> / PageRequest<T>           │
//! │   resume · cancel · classify · parse · complete once        │
//! └───────────────┬─────────────────────────────────────────────┘
//!                 │ submit / cancel
//! ┌───────────────┴─────────────────────────────────────────────┐
//! │ Transport (port)              HttpTransport (reqwest/tokio) │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Activity hook injection
pub mod activity;

/// Error types
pub mod error;

/// Pagination over list endpoints
pub mod pagination;

/// Standard response parsers
pub mod parse;

/// Request queues
pub mod queue;

/// The request state machine
pub mod request;

/// Transport port and the bundled HTTP transport
pub mod transport;

/// Common types and type aliases
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use activity::ActivityHooks;
pub use error::{BoxError, Error};
pub use pagination::{FirstPageRequest, Page, PageRequest, Paginator, Sizer};
pub use queue::RequestQueue;
pub use request::{CompletionTarget, Request, RequestOptions};
pub use transport::{
    CancelHandle, HttpTransport, HttpTransportConfig, PreparedRequest, RawResponse, ResponseMeta,
    Transport, TransportCallback, TransportFailure, TransportFailureKind,
};
pub use types::{JsonObject, JsonValue, ResponseParser};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
