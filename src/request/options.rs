//! Request options
//!
//! Behavior switches applied to a single request instance. Options are
//! immutable per instance; changing them goes through
//! [`Request::with_options`](super::Request::with_options), which produces a
//! new, independent request.

use tokio::runtime::Handle;

/// Execution context terminal callbacks are dispatched on.
#[derive(Debug, Clone, Default)]
pub enum CompletionTarget {
    /// Invoke the callback on whatever context the transport delivers on.
    #[default]
    Transport,
    /// Marshal the callback onto the given tokio runtime as its own task.
    /// The dispatch is non-blocking and safe from any delivering context,
    /// including the target runtime's own workers.
    Runtime(Handle),
}

/// Options applied to a request. All switches default to off.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    cancellation_errors: bool,
    http_errors_disabled: bool,
    friendly_messages_disabled: bool,
    completion_target: CompletionTarget,
}

impl RequestOptions {
    /// Create the default option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one terminal callback with a cancellation error when the
    /// request is cancelled, instead of silently discarding the run.
    #[must_use]
    pub fn cancellation_errors(mut self, enabled: bool) -> Self {
        self.cancellation_errors = enabled;
        self
    }

    /// Treat error status codes (>= 400) as successful completions; the
    /// status remains observable through the response metadata.
    #[must_use]
    pub fn http_errors_disabled(mut self, disabled: bool) -> Self {
        self.http_errors_disabled = disabled;
        self
    }

    /// Keep the transport's original failure messages instead of remapping
    /// common connectivity conditions to friendlier wording.
    #[must_use]
    pub fn friendly_messages_disabled(mut self, disabled: bool) -> Self {
        self.friendly_messages_disabled = disabled;
        self
    }

    /// Dispatch terminal callbacks onto the given runtime.
    #[must_use]
    pub fn complete_on(mut self, runtime: Handle) -> Self {
        self.completion_target = CompletionTarget::Runtime(runtime);
        self
    }

    /// Whether cancellation delivers a terminal error callback.
    pub fn cancellation_errors_enabled(&self) -> bool {
        self.cancellation_errors
    }

    /// Whether error status codes are passed through as successes.
    pub fn http_errors_are_disabled(&self) -> bool {
        self.http_errors_disabled
    }

    /// Whether friendly connectivity messages are suppressed.
    pub fn friendly_messages_are_disabled(&self) -> bool {
        self.friendly_messages_disabled
    }

    /// The completion dispatch target.
    pub fn completion_target(&self) -> &CompletionTarget {
        &self.completion_target
    }
}
