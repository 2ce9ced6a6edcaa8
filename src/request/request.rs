//! Public request type
//!
//! A request wraps one transport submission with options, classification,
//! parsing, and an at-most-once completion callback per run. Requests are
//! not started on construction; call [`Request::resume`] to start one.
//!
//! A resumed request keeps itself alive while running, so it can be fired
//! and forgotten. Keep a handle around only if you need to cancel it.

use super::machine::{Flavor, RequestInner, RunControl};
use super::options::RequestOptions;
use crate::activity::ActivityHooks;
use crate::error::{BoxError, Error};
use crate::parse;
use crate::transport::{PreparedRequest, ResponseMeta, Transport};
use crate::types::{JsonObject, JsonValue};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// A cancellable request yielding a parsed value of type `T`.
///
/// `Clone` hands out another handle to the same underlying request; use
/// [`Request::with_options`] for an independent copy.
pub struct Request<T> {
    pub(crate) inner: Arc<RequestInner<T>>,
}

impl<T> Clone for Request<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> Request<T> {
    /// Request turning the response into a value through the supplied
    /// parser, calling `completion` once per run when the request ends.
    ///
    /// A parser failure is reported as an invalid-data error. The completion
    /// callback runs on the transport's delivery context unless the options
    /// select a runtime.
    pub fn object(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        parser: impl Fn(&Bytes) -> Result<T, BoxError> + Send + Sync + 'static,
        completion: impl Fn(Option<T>, Option<&ResponseMeta>, Option<&Error>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: RequestInner::new(
                transport,
                request,
                options,
                Arc::new(parser),
                Flavor::Plain {
                    completion: Arc::new(completion),
                },
            ),
        }
    }

    /// Start performing the request.
    ///
    /// The request reports running immediately. Resuming a running request
    /// does nothing; a finished or cancelled request can be resumed again.
    pub fn resume(&self) {
        RequestInner::begin(&self.inner);
    }

    /// Cancel the request.
    ///
    /// The request reports not-running immediately. The completion callback
    /// is not invoked for the cancelled run, unless cancellation errors are
    /// enabled in the options, in which case it is invoked once with a
    /// cancellation error.
    pub fn cancel(&self) {
        self.inner.cancel_run();
    }

    /// Whether the request is currently running: from the moment `resume`
    /// is accepted until its completion callback has returned, or until
    /// cancellation.
    pub fn is_running(&self) -> bool {
        self.inner.running()
    }

    /// The prepared request this instance submits.
    pub fn prepared_request(&self) -> &PreparedRequest {
        self.inner.prepared()
    }

    /// The applied options.
    pub fn options(&self) -> &RequestOptions {
        self.inner.options()
    }

    /// An equivalent, independent, idle request with different options.
    ///
    /// The new request shares the prepared request, parser, and completion
    /// callback, but none of the running state.
    #[must_use]
    pub fn with_options(&self, options: RequestOptions) -> Self {
        Self {
            inner: self.inner.clone_with_options(options),
        }
    }

    /// Invoke the hooks on every entry to and exit from the running state.
    ///
    /// Attach hooks before resuming the request.
    pub fn attach_activity(&self, hooks: &ActivityHooks) {
        let hooks = hooks.clone();
        self.inner.observe(Arc::new(move |running| {
            if running {
                hooks.request_started();
            } else {
                hooks.request_stopped();
            }
        }));
    }

    pub(crate) fn from_inner(inner: Arc<RequestInner<T>>) -> Self {
        Self { inner }
    }

    pub(crate) fn control(&self) -> Arc<dyn RunControl> {
        Arc::clone(&self.inner) as Arc<dyn RunControl>
    }
}

impl Request<Bytes> {
    /// Request returning the raw response bytes.
    pub fn data(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        completion: impl Fn(Option<Bytes>, Option<&ResponseMeta>, Option<&Error>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::object(transport, request, options, |body| Ok(body.clone()), completion)
    }
}

impl Request<Vec<JsonValue>> {
    /// Request returning the response as a JSON array.
    ///
    /// The request fails with an invalid-data error if the response cannot
    /// be parsed as a JSON array.
    pub fn json_array(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        completion: impl Fn(Option<Vec<JsonValue>>, Option<&ResponseMeta>, Option<&Error>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::object(transport, request, options, parse::json_array, completion)
    }
}

impl Request<JsonObject> {
    /// Request returning the response as a JSON object.
    ///
    /// The request fails with an invalid-data error if the response cannot
    /// be parsed as a JSON object.
    pub fn json_object(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        completion: impl Fn(Option<JsonObject>, Option<&ResponseMeta>, Option<&Error>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::object(transport, request, options, parse::json_object, completion)
    }
}

impl<T: Send + 'static> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.inner.prepared().url().as_str())
            .field("running", &self.inner.running())
            .finish_non_exhaustive()
    }
}
