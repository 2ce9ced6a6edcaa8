//! Paginating requests
//!
//! A first-page request behaves like an ordinary request until completion;
//! on success it additionally computes the page that was fetched and, via
//! the paginator, the next one. Subsequent pages are fetched by feeding a
//! received page back through [`FirstPageRequest::with_page`].
//!
//! Both paginating request types deref to [`Request`], so they resume,
//! cancel, and join queues like any other request.

use super::types::Page;
use crate::error::{BoxError, Error};
use crate::parse;
use crate::request::{Flavor, Request, RequestInner, RequestOptions};
use crate::transport::{PreparedRequest, ResponseMeta, Transport};
use crate::types::{JsonObject, JsonValue};
use bytes::Bytes;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Request for the first page of a list of results.
pub struct FirstPageRequest<T> {
    request: Request<T>,
}

/// Request for one specific page of a list of results, obtained through
/// [`FirstPageRequest::with_page`].
pub struct PageRequest<T> {
    request: Request<T>,
}

impl<T: Send + 'static> FirstPageRequest<T> {
    /// Paginated request turning each response into a value through the
    /// supplied parser.
    ///
    /// The sizer defines how the original request is rewritten to ask for a
    /// page size; the paginator defines how the request for the next page
    /// is derived from a completed response, returning `None` when there is
    /// no further page.
    pub fn object(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        parser: impl Fn(&Bytes) -> Result<T, BoxError> + Send + Sync + 'static,
        sizer: impl Fn(&PreparedRequest, usize) -> PreparedRequest + Send + Sync + 'static,
        paginator: impl Fn(&PreparedRequest, &T, &ResponseMeta, usize, usize) -> Option<PreparedRequest>
            + Send
            + Sync
            + 'static,
        completion: impl Fn(Option<T>, &Page, Option<&Page>, Option<&ResponseMeta>, Option<&Error>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        let page = Page::new(Page::UNSPECIFIED_SIZE, 0, request.clone());
        let inner = RequestInner::new(
            transport,
            request.clone(),
            options,
            Arc::new(parser),
            Flavor::Paged {
                base: request,
                sizer: Arc::new(sizer),
                paginator: Arc::new(paginator),
                page,
                completion: Arc::new(completion),
            },
        );
        Self {
            request: Request::from_inner(inner),
        }
    }

    /// An equivalent request, but with the specified page size.
    ///
    /// Values below 1 are clamped to 1. The returned request is idle; it
    /// fetches page 0 at the new size once resumed.
    #[must_use]
    pub fn with_page_size(&self, size: usize) -> FirstPageRequest<T> {
        let Flavor::Paged {
            base,
            sizer,
            paginator,
            completion,
            ..
        } = self.request.inner.flavor()
        else {
            unreachable!("paginating requests always carry a pagination plan");
        };

        let size = size.max(1);
        let sized = sizer(base, size);
        let page = Page::new(size, 0, sized.clone());
        let inner = RequestInner::new(
            Arc::clone(self.request.inner.transport()),
            sized,
            self.request.inner.options().clone(),
            Arc::clone(self.request.inner.parser()),
            Flavor::Paged {
                base: base.clone(),
                sizer: Arc::clone(sizer),
                paginator: Arc::clone(paginator),
                page,
                completion: Arc::clone(completion),
            },
        );
        FirstPageRequest {
            request: Request::from_inner(inner),
        }
    }

    /// An equivalent request, but for the specified page.
    ///
    /// Pages are only ever obtained from the completion of a request
    /// descended from the same first-page request; `None` requests the
    /// first page again, at the receiver's size. Feeding a page obtained
    /// from an unrelated request lineage is undefined behavior.
    #[must_use]
    pub fn with_page(&self, page: Option<&Page>) -> PageRequest<T> {
        let Flavor::Paged {
            base,
            sizer,
            paginator,
            page: first_page,
            completion,
        } = self.request.inner.flavor()
        else {
            unreachable!("paginating requests always carry a pagination plan");
        };

        let target = page.cloned().unwrap_or_else(|| first_page.clone());
        let inner = RequestInner::new(
            Arc::clone(self.request.inner.transport()),
            target.request().clone(),
            self.request.inner.options().clone(),
            Arc::clone(self.request.inner.parser()),
            Flavor::Paged {
                base: base.clone(),
                sizer: Arc::clone(sizer),
                paginator: Arc::clone(paginator),
                page: target,
                completion: Arc::clone(completion),
            },
        );
        PageRequest {
            request: Request::from_inner(inner),
        }
    }

    /// An equivalent, independent, idle request with different options.
    #[must_use]
    pub fn with_options(&self, options: RequestOptions) -> FirstPageRequest<T> {
        FirstPageRequest {
            request: self.request.with_options(options),
        }
    }
}

impl FirstPageRequest<Bytes> {
    /// Paginated request returning the raw bytes of each page.
    pub fn data(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        sizer: impl Fn(&PreparedRequest, usize) -> PreparedRequest + Send + Sync + 'static,
        paginator: impl Fn(&PreparedRequest, &Bytes, &ResponseMeta, usize, usize) -> Option<PreparedRequest>
            + Send
            + Sync
            + 'static,
        completion: impl Fn(Option<Bytes>, &Page, Option<&Page>, Option<&ResponseMeta>, Option<&Error>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::object(
            transport,
            request,
            options,
            |body| Ok(body.clone()),
            sizer,
            paginator,
            completion,
        )
    }
}

impl FirstPageRequest<Vec<JsonValue>> {
    /// Paginated request returning each page as a JSON array.
    pub fn json_array(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        sizer: impl Fn(&PreparedRequest, usize) -> PreparedRequest + Send + Sync + 'static,
        paginator: impl Fn(
                &PreparedRequest,
                &Vec<JsonValue>,
                &ResponseMeta,
                usize,
                usize,
            ) -> Option<PreparedRequest>
            + Send
            + Sync
            + 'static,
        completion: impl Fn(
                Option<Vec<JsonValue>>,
                &Page,
                Option<&Page>,
                Option<&ResponseMeta>,
                Option<&Error>,
            ) + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::object(
            transport,
            request,
            options,
            parse::json_array,
            sizer,
            paginator,
            completion,
        )
    }
}

impl FirstPageRequest<JsonObject> {
    /// Paginated request returning each page as a JSON object.
    pub fn json_object(
        transport: Arc<dyn Transport>,
        request: PreparedRequest,
        options: RequestOptions,
        sizer: impl Fn(&PreparedRequest, usize) -> PreparedRequest + Send + Sync + 'static,
        paginator: impl Fn(
                &PreparedRequest,
                &JsonObject,
                &ResponseMeta,
                usize,
                usize,
            ) -> Option<PreparedRequest>
            + Send
            + Sync
            + 'static,
        completion: impl Fn(
                Option<JsonObject>,
                &Page,
                Option<&Page>,
                Option<&ResponseMeta>,
                Option<&Error>,
            ) + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::object(
            transport,
            request,
            options,
            parse::json_object,
            sizer,
            paginator,
            completion,
        )
    }
}

impl<T: Send + 'static> PageRequest<T> {
    /// The page this request fetches.
    pub fn page(&self) -> &Page {
        let Flavor::Paged { page, .. } = self.request.inner.flavor() else {
            unreachable!("paginating requests always carry a pagination plan");
        };
        page
    }

    /// An equivalent, independent, idle request with different options.
    #[must_use]
    pub fn with_options(&self, options: RequestOptions) -> PageRequest<T> {
        PageRequest {
            request: self.request.with_options(options),
        }
    }
}

impl<T> Deref for FirstPageRequest<T> {
    type Target = Request<T>;

    fn deref(&self) -> &Request<T> {
        &self.request
    }
}

impl<T> Deref for PageRequest<T> {
    type Target = Request<T>;

    fn deref(&self) -> &Request<T> {
        &self.request
    }
}

impl<T> Clone for FirstPageRequest<T> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
        }
    }
}

impl<T> Clone for PageRequest<T> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for FirstPageRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstPageRequest")
            .field("url", &self.request.prepared_request().url().as_str())
            .field("running", &self.request.is_running())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> fmt::Debug for PageRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRequest")
            .field("page", self.page())
            .field("running", &self.request.is_running())
            .finish_non_exhaustive()
    }
}
