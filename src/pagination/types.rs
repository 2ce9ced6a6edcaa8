//! Pagination types
//!
//! A [`Page`] describes one position in a paginated result set; sizers and
//! paginators are the two caller-supplied functions that teach a request
//! how a given service expresses page size and page position.

use crate::transport::{PreparedRequest, ResponseMeta};
use std::fmt;
use std::sync::Arc;

/// Derives a prepared request asking for a given page size from the
/// original request of a pagination lineage.
///
/// Invoked lazily, the first time a size other than
/// [`Page::UNSPECIFIED_SIZE`] is requested.
pub type Sizer = Arc<dyn Fn(&PreparedRequest, usize) -> PreparedRequest + Send + Sync>;

/// Derives the prepared request for the next page from a completed one.
///
/// Receives the request that just ran, the parsed value, the response
/// metadata, and the size and number of the page to be loaded. Returning
/// `None` signals that no further page exists.
pub type Paginator<T> = Arc<
    dyn Fn(&PreparedRequest, &T, &ResponseMeta, usize, usize) -> Option<PreparedRequest>
        + Send
        + Sync,
>;

/// One position in a paginated result set.
///
/// Pages are never constructed by callers; they are returned by completed
/// paginating requests, and fed back through
/// [`FirstPageRequest::with_page`](super::FirstPageRequest::with_page) to
/// fetch the position they describe. A page only ever points forward: it
/// holds no reference to the pages that preceded it.
#[derive(Clone, PartialEq)]
pub struct Page {
    size: usize,
    number: usize,
    request: PreparedRequest,
}

impl Page {
    /// Page size value meaning "unspecified, use the server default".
    pub const UNSPECIFIED_SIZE: usize = 0;

    pub(crate) fn new(size: usize, number: usize, request: PreparedRequest) -> Self {
        Self {
            size,
            number,
            request,
        }
    }

    /// The requested page size. This is the size that was asked for, not
    /// the number of records the page actually contains.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The page number, starting at 0 for the first page.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The prepared request fetching exactly this page.
    pub(crate) fn request(&self) -> &PreparedRequest {
        &self.request
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("size", &self.size)
            .field("number", &self.number)
            .field("url", &self.request.url().as_str())
            .finish()
    }
}
