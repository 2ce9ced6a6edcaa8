//! Request queue
//!
//! Aggregates any number of independently completing requests into one
//! running/finished signal with per-episode error collection. The queue
//! observes requests, it never owns them: registrations are weak, and the
//! queue is not the reason a request or its callback stays alive.

use crate::error::Error;
use crate::request::{Request, RunControl, StateObserver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

type StateChangeFn = Arc<dyn Fn(bool, Option<&Error>) + Send + Sync>;

/// A collection of related requests exposing a single running state.
///
/// The queue is running iff at least one request added to it is running;
/// an empty queue never runs. Requests added to a queue keep their own
/// lifecycle; the queue merely observes their transitions and can forward
/// `resume` and `cancel` to all of them.
///
/// The state-change callback, when provided, is invoked with
/// `(finished = false, no error)` each time the queue starts running, and
/// `(finished = true, collected error)` each time it stops. The finished
/// notification fires strictly after the completion callbacks of the
/// requests whose completion ended the episode. Errors reported during an
/// episode are discarded once the finished notification has returned.
///
/// `Clone` shares the same queue. Queues are not reusable in the sense
/// that requests can never be removed; start a fresh queue for a fresh
/// batch.
pub struct RequestQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    state: Mutex<QueueState>,
    state_change: Option<StateChangeFn>,
}

struct QueueState {
    entries: Vec<Entry>,
    running: usize,
    errors: Vec<Error>,
}

/// One observed request. Entries are append-only, so the index doubles as
/// the observer token; `counted` guards the running counter against the
/// races between registration and the request's own transitions.
struct Entry {
    control: Weak<dyn RunControl>,
    counted: bool,
}

enum EdgeTransition {
    None,
    Started,
    Finished(Option<Error>),
}

impl RequestQueue {
    /// Create a queue without a state-change callback.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    entries: Vec::new(),
                    running: 0,
                    errors: Vec::new(),
                }),
                state_change: None,
            }),
        }
    }

    /// Create a queue calling `state_change` when its running state flips.
    pub fn with_state_change(
        state_change: impl Fn(bool, Option<&Error>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    entries: Vec::new(),
                    running: 0,
                    errors: Vec::new(),
                }),
                state_change: Some(Arc::new(state_change)),
            }),
        }
    }

    /// Add a request to the queue, optionally resuming it.
    ///
    /// The queue state adjusts immediately: adding an already-running
    /// request flips an idle queue to running without waiting for another
    /// transition.
    pub fn add<T: Send + 'static>(&self, request: &Request<T>, resume: bool) {
        let control = request.control();

        let index = {
            let mut state = self.inner.lock();
            state.entries.push(Entry {
                control: Arc::downgrade(&control),
                counted: false,
            });
            state.entries.len() - 1
        };

        let queue = Arc::downgrade(&self.inner);
        let observer: StateObserver = Arc::new(move |running| {
            if let Some(inner) = queue.upgrade() {
                inner.request_changed(index, running);
            }
        });

        if control.attach_observer(observer) {
            self.inner.request_changed(index, true);
        }
        if resume {
            Arc::clone(&control).resume_control();
        }
    }

    /// Call `resume` on every request in the queue.
    pub fn resume(&self) {
        for control in self.inner.live_controls() {
            control.resume_control();
        }
    }

    /// Call `cancel` on every request in the queue.
    pub fn cancel(&self) {
        for control in self.inner.live_controls() {
            control.cancel_control();
        }
    }

    /// Report an error encountered by one of the queue's requests.
    ///
    /// Nothing happens for `None`, so completion callbacks can forward
    /// their error parameter unconditionally. Collected errors surface
    /// through the finished state-change notification: one error is passed
    /// through as is, several are wrapped into [`Error::Multiple`].
    pub fn report_error(&self, error: Option<Error>) {
        let Some(error) = error else { return };
        debug!("queue collected error: {error}");
        self.inner.lock().errors.push(error);
    }

    /// Whether at least one request in the queue is running.
    pub fn is_running(&self) -> bool {
        self.inner.lock().running > 0
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RequestQueue {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("RequestQueue")
            .field("requests", &state.entries.len())
            .field("running", &(state.running > 0))
            .finish_non_exhaustive()
    }
}

impl QueueInner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_controls(&self) -> Vec<Arc<dyn RunControl>> {
        self.lock()
            .entries
            .iter()
            .filter_map(|entry| entry.control.upgrade())
            .collect()
    }

    /// Process a running-state notification of the request behind `index`.
    ///
    /// The reported edge is ignored in favor of the request's actual state:
    /// observer notifications are emitted outside the request's own lock
    /// and can arrive out of order when resume and cancel race, so each one
    /// is treated as a prompt to re-synchronize. The last notification for
    /// any sequence of transitions always reads the settled state, which
    /// keeps the counter convergent.
    ///
    /// The state-change callback is invoked without any lock held, so it
    /// can freely call back into the queue.
    fn request_changed(&self, index: usize, _reported_running: bool) {
        let edge = {
            let mut state = self.lock();
            let Some(entry) = state.entries.get_mut(index) else {
                return;
            };
            let running_now = entry
                .control
                .upgrade()
                .map_or(false, |control| control.is_running());

            if running_now && !entry.counted {
                entry.counted = true;
                state.running += 1;
                if state.running == 1 {
                    EdgeTransition::Started
                } else {
                    EdgeTransition::None
                }
            } else if !running_now && entry.counted {
                entry.counted = false;
                state.running -= 1;
                if state.running == 0 {
                    EdgeTransition::Finished(Error::aggregate(state.errors.clone()))
                } else {
                    EdgeTransition::None
                }
            } else {
                EdgeTransition::None
            }
        };

        match edge {
            EdgeTransition::Started => {
                debug!("queue started running");
                if let Some(callback) = &self.state_change {
                    callback(false, None);
                }
            }
            EdgeTransition::Finished(error) => {
                debug!("queue finished running");
                if let Some(callback) = &self.state_change {
                    callback(true, error.as_ref());
                }
                // Collected errors live until the finished notification has
                // been delivered, then the episode is over.
                self.lock().errors.clear();
            }
            EdgeTransition::None => {}
        }
    }
}
