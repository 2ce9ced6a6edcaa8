//! Transport port
//!
//! Requests consume the network exclusively through this module: a
//! [`Transport`] executes a [`PreparedRequest`] and reports back a raw
//! response or a transport failure through a one-shot callback, and the
//! returned [`CancelHandle`] aborts the submission.
//!
//! [`HttpTransport`] is the bundled reqwest-backed implementation; tests and
//! embedders can substitute their own.

mod http;
mod prepared;
mod types;

pub use http::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder};
pub use prepared::PreparedRequest;
pub use types::{
    CancelHandle, RawResponse, ResponseMeta, Transport, TransportCallback, TransportFailure,
    TransportFailureKind,
};
