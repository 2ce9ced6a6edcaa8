//! Request run machinery
//!
//! One mutex-guarded run register per request carries the whole lifecycle:
//! a running flag, a monotonically increasing run generation, the transport
//! cancel handle, and the state observers. Every transition goes through
//! this module, and the generation check in `complete` is the single point
//! deciding whether a late transport delivery is still wanted.

use super::classify::classify;
use super::options::{CompletionTarget, RequestOptions};
use crate::error::Error;
use crate::pagination::{Page, Paginator, Sizer};
use crate::transport::{
    CancelHandle, PreparedRequest, RawResponse, ResponseMeta, Transport, TransportCallback,
    TransportFailure,
};
use crate::types::ResponseParser;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Observer notified with the new running state on every entry to and exit
/// from the running state.
pub(crate) type StateObserver = Arc<dyn Fn(bool) + Send + Sync>;

/// Completion callback for plain requests.
pub(crate) type PlainCompletion<T> =
    Arc<dyn Fn(Option<T>, Option<&ResponseMeta>, Option<&Error>) + Send + Sync>;

/// Completion callback for paginating requests.
pub(crate) type PagedCompletion<T> =
    Arc<dyn Fn(Option<T>, &Page, Option<&Page>, Option<&ResponseMeta>, Option<&Error>) + Send + Sync>;

/// What a request delivers on completion: a plain value/meta/error triple,
/// or the paginated variant that additionally threads the page chain.
pub(crate) enum Flavor<T> {
    Plain {
        completion: PlainCompletion<T>,
    },
    Paged {
        /// The original request the pagination lineage started from, before
        /// any page size was applied. Sizers always derive from this.
        base: PreparedRequest,
        sizer: Sizer,
        paginator: Paginator<T>,
        /// The page this instance fetches.
        page: Page,
        completion: PagedCompletion<T>,
    },
}

impl<T> Clone for Flavor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain { completion } => Self::Plain {
                completion: Arc::clone(completion),
            },
            Self::Paged {
                base,
                sizer,
                paginator,
                page,
                completion,
            } => Self::Paged {
                base: base.clone(),
                sizer: Arc::clone(sizer),
                paginator: Arc::clone(paginator),
                page: page.clone(),
                completion: Arc::clone(completion),
            },
        }
    }
}

/// Type-erased lifecycle control, used by `RequestQueue` so requests of any
/// parsed type can share one queue.
pub(crate) trait RunControl: Send + Sync {
    fn resume_control(self: Arc<Self>);
    fn cancel_control(&self);
    fn is_running(&self) -> bool;
    /// Register an observer and report whether the request is currently
    /// running, atomically with respect to state transitions.
    fn attach_observer(&self, observer: StateObserver) -> bool;
}

struct RunState {
    running: bool,
    generation: u64,
    handle: Option<CancelHandle>,
    observers: Vec<StateObserver>,
}

pub(crate) struct RequestInner<T> {
    transport: Arc<dyn Transport>,
    prepared: PreparedRequest,
    options: RequestOptions,
    parser: ResponseParser<T>,
    flavor: Flavor<T>,
    state: Mutex<RunState>,
}

impl<T: Send + 'static> RequestInner<T> {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        prepared: PreparedRequest,
        options: RequestOptions,
        parser: ResponseParser<T>,
        flavor: Flavor<T>,
    ) -> Arc<Self> {
        Arc::new(Self {
            transport,
            prepared,
            options,
            parser,
            flavor,
            state: Mutex::new(RunState {
                running: false,
                generation: 0,
                handle: None,
                observers: Vec::new(),
            }),
        })
    }

    /// A new, idle instance with different options, sharing the prepared
    /// request, parser, and completion callback but no running state.
    pub(crate) fn clone_with_options(&self, options: RequestOptions) -> Arc<Self> {
        Self::new(
            Arc::clone(&self.transport),
            self.prepared.clone(),
            options,
            Arc::clone(&self.parser),
            self.flavor.clone(),
        )
    }

    pub(crate) fn prepared(&self) -> &PreparedRequest {
        &self.prepared
    }

    pub(crate) fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub(crate) fn parser(&self) -> &ResponseParser<T> {
        &self.parser
    }

    pub(crate) fn flavor(&self) -> &Flavor<T> {
        &self.flavor
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a run. No-op while already running; a finished or cancelled
    /// request starts over.
    pub(crate) fn begin(this: &Arc<Self>) {
        let (generation, observers) = {
            let mut state = this.lock();
            if state.running {
                debug!("resume ignored, request already running");
                return;
            }
            state.running = true;
            state.generation += 1;
            (state.generation, state.observers.clone())
        };

        debug!(
            "starting {} {}",
            this.prepared.method(),
            this.prepared.url()
        );
        for observer in &observers {
            observer(true);
        }

        let shared = Arc::clone(this);
        let callback: TransportCallback =
            Box::new(move |outcome| Self::complete(&shared, generation, outcome));
        let handle = this.transport.submit(this.prepared.clone(), callback);

        // The run may already be over (cancelled, or completed inline by a
        // synchronous transport) by the time the handle comes back.
        let stale = {
            let mut state = this.lock();
            if state.running && state.generation == generation {
                state.handle = Some(handle);
                None
            } else {
                Some(handle)
            }
        };
        if let Some(handle) = stale {
            handle.cancel();
        }
    }

    /// Cancel the current run, if any. The request reports not-running
    /// before this returns; a late transport delivery for the cancelled run
    /// is suppressed by the generation bump.
    pub(crate) fn cancel_run(&self) {
        let (handle, observers) = {
            let mut state = self.lock();
            if !state.running {
                return;
            }
            state.running = false;
            state.generation += 1;
            (state.handle.take(), state.observers.clone())
        };

        debug!("cancelled {}", self.prepared.url());
        for observer in &observers {
            observer(false);
        }
        if let Some(handle) = handle {
            handle.cancel();
        }

        if self.options.cancellation_errors_enabled() {
            let error = Error::Cancelled;
            match &self.flavor {
                Flavor::Plain { completion } => {
                    let completion = Arc::clone(completion);
                    self.dispatch(move || completion(None, None, Some(&error)));
                }
                Flavor::Paged {
                    page, completion, ..
                } => {
                    let completion = Arc::clone(completion);
                    let page = page.clone();
                    self.dispatch(move || completion(None, &page, None, None, Some(&error)));
                }
            }
        }
    }

    pub(crate) fn running(&self) -> bool {
        self.lock().running
    }

    /// Register a state observer; returns whether the request is currently
    /// running. Registration and the running read happen under the run
    /// register lock, so a transition can never slip between them.
    pub(crate) fn observe(&self, observer: StateObserver) -> bool {
        let mut state = self.lock();
        state.observers.push(observer);
        state.running
    }

    /// Handle a transport delivery for the run identified by `generation`.
    fn complete(this: &Arc<Self>, generation: u64, outcome: Result<RawResponse, TransportFailure>) {
        {
            let state = this.lock();
            if !state.running || state.generation != generation {
                debug!("suppressing completion of a cancelled run");
                return;
            }
        }

        let (value, meta, error) = match classify(this.prepared.url(), outcome, &this.options) {
            Ok((body, meta)) => match (this.parser)(&body) {
                Ok(value) => (Some(value), Some(meta), None),
                Err(parse_error) => (None, Some(meta), Some(Error::invalid_data(parse_error))),
            },
            Err((error, meta)) => (None, meta, Some(error)),
        };

        match &error {
            Some(error) => debug!("{} failed: {}", this.prepared.url(), error),
            None => debug!("{} finished", this.prepared.url()),
        }

        let shared = Arc::clone(this);
        match &this.flavor {
            Flavor::Plain { completion } => {
                let completion = Arc::clone(completion);
                this.dispatch(move || {
                    completion(value, meta.as_ref(), error.as_ref());
                    shared.finish(generation);
                });
            }
            Flavor::Paged {
                paginator,
                page,
                completion,
                ..
            } => {
                let next = match (&value, &meta, &error) {
                    (Some(value), Some(meta), None) => paginator(
                        &this.prepared,
                        value,
                        meta,
                        page.size(),
                        page.number() + 1,
                    )
                    .map(|request| Page::new(page.size(), page.number() + 1, request)),
                    _ => None,
                };
                let completion = Arc::clone(completion);
                let page = page.clone();
                this.dispatch(move || {
                    completion(value, &page, next.as_ref(), meta.as_ref(), error.as_ref());
                    shared.finish(generation);
                });
            }
        }
    }

    /// Leave the running state after the terminal callback has returned.
    /// No-op when the run was cancelled in the meantime.
    fn finish(&self, generation: u64) {
        let observers = {
            let mut state = self.lock();
            if !state.running || state.generation != generation {
                return;
            }
            state.running = false;
            state.handle = None;
            state.observers.clone()
        };
        for observer in &observers {
            observer(false);
        }
    }

    /// Run the terminal callback on the configured completion context.
    ///
    /// Dispatching onto a runtime is a single non-blocking spawn, safe from
    /// any delivering context including the target runtime's own workers,
    /// so it never stacks dispatches and never deadlocks.
    fn dispatch(&self, callback: impl FnOnce() + Send + 'static) {
        match self.options.completion_target() {
            CompletionTarget::Transport => callback(),
            CompletionTarget::Runtime(runtime) => {
                drop(runtime.spawn(async move { callback() }));
            }
        }
    }
}

impl<T: Send + 'static> RunControl for RequestInner<T> {
    fn resume_control(self: Arc<Self>) {
        Self::begin(&self);
    }

    fn cancel_control(&self) {
        self.cancel_run();
    }

    fn is_running(&self) -> bool {
        self.running()
    }

    fn attach_observer(&self, observer: StateObserver) -> bool {
        self.observe(observer)
    }
}

impl<T> Drop for RequestInner<T> {
    fn drop(&mut self) {
        // A submission the transport abandoned without completing would
        // otherwise keep running with nobody listening.
        if let Ok(state) = self.state.get_mut() {
            if let Some(handle) = state.handle.take() {
                handle.cancel();
            }
        }
    }
}
