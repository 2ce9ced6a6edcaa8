//! Request grouping
//!
//! A [`RequestQueue`] groups requests for which a common running signal is
//! wanted, whether they run in parallel or in cascade.

#[allow(clippy::module_inception)]
mod queue;

pub use queue::RequestQueue;
