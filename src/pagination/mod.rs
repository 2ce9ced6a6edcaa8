//! Pagination
//!
//! Cursor-style pagination over list endpoints: a first-page request
//! produces, on every successful completion, the page it fetched and the
//! next page if the service reports one. Pages form a forward chain with
//! strictly increasing page numbers; following it re-enters the same
//! request machinery for every page.

mod requests;
mod types;

pub use requests::{FirstPageRequest, PageRequest};
pub use types::{Page, Paginator, Sizer};
