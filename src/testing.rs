//! Deterministic transport double for unit tests
//!
//! Submissions are held until the test delivers them by hand, so lifecycle
//! races (cancel vs. completion, suppression, re-resume) can be exercised
//! without a network or a runtime.

use crate::transport::{
    CancelHandle, PreparedRequest, RawResponse, ResponseMeta, Transport, TransportCallback,
    TransportFailure,
};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use url::Url;

pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    submissions: Vec<Submission>,
}

struct Submission {
    request: PreparedRequest,
    callback: Option<TransportCallback>,
    cancelled: bool,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(MockState {
                submissions: Vec::new(),
            })),
        })
    }

    pub(crate) fn submission_count(&self) -> usize {
        self.state.lock().unwrap().submissions.len()
    }

    pub(crate) fn request(&self, index: usize) -> PreparedRequest {
        self.state.lock().unwrap().submissions[index].request.clone()
    }

    pub(crate) fn is_cancelled(&self, index: usize) -> bool {
        self.state.lock().unwrap().submissions[index].cancelled
    }

    /// Deliver an outcome for the given submission, invoking its callback
    /// inline on the calling thread. Does nothing if the submission was
    /// already delivered or abandoned.
    pub(crate) fn deliver(&self, index: usize, outcome: Result<RawResponse, TransportFailure>) {
        let callback = self.state.lock().unwrap().submissions[index].callback.take();
        if let Some(callback) = callback {
            callback(outcome);
        }
    }

    /// Deliver a successful response with the given status and body, served
    /// from the URL that was requested.
    pub(crate) fn respond(&self, index: usize, status: u16, body: &'static [u8]) {
        let url = self.request(index).url().clone();
        self.deliver(index, Ok(response(url, status, body)));
    }

    /// Drop the submission's callback without invoking it, as a transport
    /// tearing down would.
    pub(crate) fn abandon(&self, index: usize) {
        // Taken out first: dropping the callback can release the request,
        // whose cleanup cancels the handle and locks this state again.
        let callback = self.state.lock().unwrap().submissions[index].callback.take();
        drop(callback);
    }
}

impl Transport for MockTransport {
    fn submit(&self, request: PreparedRequest, on_complete: TransportCallback) -> CancelHandle {
        let index = {
            let mut state = self.state.lock().unwrap();
            state.submissions.push(Submission {
                request,
                callback: Some(on_complete),
                cancelled: false,
            });
            state.submissions.len() - 1
        };

        let state = Arc::clone(&self.state);
        CancelHandle::new(move || {
            state.lock().unwrap().submissions[index].cancelled = true;
        })
    }
}

/// Build a raw response served from `url`.
pub(crate) fn response(url: Url, status: u16, body: &'static [u8]) -> RawResponse {
    RawResponse {
        meta: ResponseMeta::new(
            url,
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
        ),
        body: Bytes::from_static(body),
    }
}

/// Build a raw response served from a different host than any request under
/// test, to trigger redirect classification.
pub(crate) fn redirected_response(status: u16, body: &'static [u8]) -> RawResponse {
    response(
        Url::parse("https://portal.captive.example/login").unwrap(),
        status,
        body,
    )
}
