use super::types::ErrorDetail;
use std::time::Duration;

/// Error types for long-running operation polling.
///
/// Local give-ups ([`Timeout`](PollerError::Timeout),
/// [`Cancelled`](PollerError::Cancelled)) are deliberately distinct from
/// [`OperationFailed`](PollerError::OperationFailed): after a give-up the
/// remote operation is still running server-side and its fate is unknown.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PollerError {
    /// The initiating request itself was rejected; nothing is running server-side.
    #[error("Operation submission rejected: {0}")]
    Submission(String),

    /// One status query failed in transit; the query may be retried by the caller.
    #[error("Status query failed: {0}")]
    PollQuery(String),

    /// The remote operation reached its failure terminal state.
    #[error("Operation failed: {}", format_details(.details))]
    OperationFailed { details: Vec<ErrorDetail> },

    /// The configured wait cap elapsed; the remote operation was not aborted.
    #[error("Gave up waiting after {waited:?}; the operation may still be running")]
    Timeout { waited: Duration },

    /// The caller's cancellation signal fired; the remote operation was not aborted.
    #[error("Wait cancelled; the operation may still be running")]
    Cancelled,

    /// Programming error, e.g. reading a result before terminality.
    #[error("Invalid poller use: {0}")]
    IllegalState(String),
}

fn format_details(details: &[ErrorDetail]) -> String {
    details
        .iter()
        .map(ErrorDetail::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// Result type alias for convenience
pub type PollerResult<T> = Result<T, PollerError>;
