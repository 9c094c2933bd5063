//! Drives a cursor chain to exhaustion.

use std::future::Future;
use tracing::debug;

use crate::domain::{Page, PageCursor, PageLimit, RpcClientError};

/// Default cap on pages fetched by [`Paginator::collect_all`].
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Repeats a listing call, feeding each page's cursor into the next.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    limit: Option<PageLimit>,
    max_pages: usize,
}

impl Paginator {
    pub fn new(limit: Option<PageLimit>) -> Self {
        Self {
            limit,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetches pages until `has_next_page` is false and concatenates them.
    ///
    /// ```ignore
    /// let events = Paginator::new(Some(PageLimit::new(50)?))
    ///     .collect_all(|cursor, limit| async move {
    ///         client.query_events(&filter, cursor.as_ref(), limit, options).await
    ///     })
    ///     .await?;
    /// ```
    pub async fn collect_all<T, F, Fut>(&self, mut fetch: F) -> Result<Vec<T>, RpcClientError>
    where
        F: FnMut(Option<PageCursor>, Option<PageLimit>) -> Fut,
        Fut: Future<Output = Result<Page<T>, RpcClientError>>,
    {
        let mut items = Vec::new();
        let mut cursor: Option<PageCursor> = None;

        for page_no in 0..self.max_pages {
            let page = fetch(cursor.clone(), self.limit).await?;
            let (data, next) = page.into_parts();
            debug!(page = page_no, items = data.len(), "fetched page");
            items.extend(data);

            match next {
                Some(next) if cursor.as_ref() == Some(&next) => {
                    return Err(RpcClientError::unexpected(
                        "paginator",
                        format!("cursor {} repeated", next.key()),
                    ));
                }
                Some(next) => cursor = Some(next),
                None => return Ok(items),
            }
        }

        Err(RpcClientError::unexpected(
            "paginator",
            format!("gave up after {} pages", self.max_pages),
        ))
    }
}
