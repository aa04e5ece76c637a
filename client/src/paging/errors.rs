/// Error types for paged sequence walking.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PageError {
    /// One page fetch failed in transit; the fetch may be retried by the caller.
    #[error("Page fetch failed: {0}")]
    Fetch(String),

    /// The server rejected the continuation token (e.g. expired).
    ///
    /// Terminal for the walker instance that observed it; restart with a
    /// fresh first-page fetch.
    #[error("Continuation token rejected: {0}")]
    InvalidContinuation(String),
}

// Result type alias for convenience
pub type PageResult<T> = Result<T, PageError>;
