//! Activity hooks
//!
//! A pair of injected callbacks a request invokes when it enters and leaves
//! the running state. This is the integration point for a network activity
//! indicator or any other presentation-side bookkeeping, which stays out of
//! the core.

use std::fmt;
use std::sync::Arc;

/// Callbacks invoked on every running-state entry and exit of the requests
/// they are attached to. The two calls are always balanced for a given run.
#[derive(Clone)]
pub struct ActivityHooks {
    on_start: Arc<dyn Fn() + Send + Sync>,
    on_stop: Arc<dyn Fn() + Send + Sync>,
}

impl ActivityHooks {
    /// Create a hook pair.
    pub fn new(
        on_start: impl Fn() + Send + Sync + 'static,
        on_stop: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_start: Arc::new(on_start),
            on_stop: Arc::new(on_stop),
        }
    }

    pub(crate) fn request_started(&self) {
        (self.on_start)();
    }

    pub(crate) fn request_stopped(&self) {
        (self.on_stop)();
    }
}

impl fmt::Debug for ActivityHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityHooks").finish_non_exhaustive()
    }
}
