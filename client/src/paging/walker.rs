//! Walking driver for paginated result sets.
//!
//! The walker turns a first-page call plus a continuation-token call into a
//! lazy, forward-only item stream. No page is fetched before the previous
//! one is exhausted, and nothing is fetched past a page without a token.

use super::errors::{PageError, PageResult};
use super::types::Page;
use async_trait::async_trait;
use futures::stream::{Stream, TryStreamExt};
use std::collections::VecDeque;
use std::sync::Arc;

/// Service-specific calls the walker drives.
///
/// Implementations wrap the two external collaborators of a paginated
/// listing: the initial request and the follow-up request carrying the
/// opaque continuation token from the previous page.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Issues the initial listing request.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Fetch`] on transport or server failure.
    async fn fetch_first(&self) -> PageResult<Page<T>>;

    /// Issues a follow-up request for the page after `continuation_token`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Fetch`] on transport or server failure, or
    /// [`PageError::InvalidContinuation`] when the server rejects the token.
    async fn fetch_next(&self, continuation_token: &str) -> PageResult<Page<T>>;
}

/// Presents a paginated collection as one lazy, ordered item sequence.
///
/// One walker instance drives one pass over one listing; restarting means
/// building a new walker. Instances share no state, so callers may walk any
/// number of listings concurrently.
///
/// # Examples
///
/// ```no_run
/// use client::paging::PagedWalker;
/// use futures::TryStreamExt;
/// use std::sync::Arc;
///
/// async fn example(fetcher: Arc<dyn client::paging::PageFetcher<String>>)
/// -> Result<(), Box<dyn std::error::Error>> {
///     let walker = PagedWalker::new(fetcher);
///     let mut stream = Box::pin(walker.into_stream());
///     while let Some(item) = stream.try_next().await? {
///         println!("{item}");
///     }
///     Ok(())
/// }
/// ```
pub struct PagedWalker<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
}

struct WalkState<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    buffer: VecDeque<T>,
    continuation_token: Option<String>,
    started: bool,
}

impl<T: Send + 'static> PagedWalker<T> {
    pub fn new(fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        Self { fetcher }
    }

    /// Fetches the first page directly, for callers that manage paging
    /// themselves.
    pub async fn fetch_first(&self) -> PageResult<Page<T>> {
        self.fetcher.fetch_first().await
    }

    /// Fetches the page after `continuation_token` directly.
    pub async fn fetch_next(&self, continuation_token: &str) -> PageResult<Page<T>> {
        self.fetcher.fetch_next(continuation_token).await
    }

    /// Turns the walker into a lazy stream over every item of the listing.
    ///
    /// The stream is forward-only and single-pass: pulling the next item
    /// fetches the first page on demand, then one follow-up page each time
    /// the current page is exhausted and a continuation token is present.
    /// Consuming a page without a token ends the stream; an empty first page
    /// without a token yields an empty stream after exactly one fetch. Item
    /// order equals server-returned order within and across pages.
    pub fn into_stream(self) -> impl Stream<Item = PageResult<T>> {
        let state = WalkState {
            fetcher: self.fetcher,
            buffer: VecDeque::new(),
            continuation_token: None,
            started: false,
        };

        futures::stream::try_unfold(state, |mut state| async move {
            loop {
                if let Some(item) = state.buffer.pop_front() {
                    return Ok(Some((item, state)));
                }

                let page = if !state.started {
                    state.started = true;
                    log::debug!("fetching first page");
                    state.fetcher.fetch_first().await?
                } else {
                    match state.continuation_token.take() {
                        Some(token) => {
                            log::debug!("fetching next page for token {token}");
                            state.fetcher.fetch_next(&token).await?
                        }
                        // Last page consumed; the sequence is complete.
                        None => return Ok(None),
                    }
                };

                state.continuation_token = page.continuation_token;
                state.buffer = page.items.into_iter().collect();
            }
        })
    }

    /// Drains the whole listing into memory.
    ///
    /// Convenience for small collections; large listings should consume
    /// [`into_stream`](Self::into_stream) instead to keep the one-page
    /// memory bound.
    pub async fn collect_all(self) -> PageResult<Vec<T>> {
        Box::pin(self.into_stream()).try_collect().await
    }
}
