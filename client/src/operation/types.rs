//! Types and data structures for long-running operations.
//!
//! This module defines the operation state machine, the per-poll snapshot
//! returned by status queries, and the caller-owned configuration that
//! governs blocking waits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a long-running operation.
///
/// Transitions are `NotStarted → InProgress → {Succeeded, Failed, Cancelled}`.
/// The three terminal states never transition again; once a poll observes one,
/// every later observation reports the same state.
///
/// Wire names follow the service convention (`"notStarted"`, `"running"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// Accepted by the service but not yet picked up
    #[serde(rename = "notStarted")]
    NotStarted,
    /// Actively running server-side
    #[serde(rename = "running")]
    InProgress,
    /// Finished with a result payload
    #[serde(rename = "succeeded")]
    Succeeded,
    /// Finished with one or more error details
    #[serde(rename = "failed")]
    Failed,
    /// Stopped at the caller's request before completion
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl OperationStatus {
    /// Returns `true` for states from which no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Succeeded | OperationStatus::Failed | OperationStatus::Cancelled
        )
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationStatus::NotStarted => "not started",
            OperationStatus::InProgress => "in progress",
            OperationStatus::Succeeded => "succeeded",
            OperationStatus::Failed => "failed",
            OperationStatus::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// One server-reported error with its service error code.
///
/// Preserved verbatim from the status response so callers can discriminate
/// root causes (bad input vs. unsupported content vs. quota) by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Snapshot of a long-running operation as of the most recent status query.
///
/// Produced by [`OperationClient`](super::OperationClient) implementations and
/// held by the poller. `result` is populated only in [`OperationStatus::Succeeded`];
/// `errors` only in [`OperationStatus::Failed`].
#[derive(Debug, Clone)]
pub struct Operation<R> {
    /// Opaque token/location used to re-query status
    pub token: String,
    /// State observed by the last status query
    pub status: OperationStatus,
    /// When the last status query completed
    pub last_polled_at: DateTime<Utc>,
    /// Server hint for the minimum delay before the next query
    pub retry_after: Option<Duration>,
    /// Decoded success payload, present only once `Succeeded`
    pub result: Option<R>,
    /// Server-reported error list, present only once `Failed`
    pub errors: Vec<ErrorDetail>,
}

impl<R> Operation<R> {
    /// Creates a freshly accepted operation in [`OperationStatus::NotStarted`].
    pub fn accepted(token: String, retry_after: Option<Duration>) -> Self {
        Self {
            token,
            status: OperationStatus::NotStarted,
            last_polled_at: Utc::now(),
            retry_after,
            result: None,
            errors: Vec::new(),
        }
    }

    /// Returns `true` once the operation has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Configuration for blocking waits on a long-running operation.
///
/// Owned by the caller for the lifetime of one
/// [`wait_for_completion`](super::OperationPoller::wait_for_completion)
/// invocation. Deserializable from configuration files; unset values fall
/// back to defaults when accessed.
///
/// # Examples
///
/// ```no_run
/// use client::operation::PollConfig;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// let cancel = CancellationToken::new();
/// let config = PollConfig::new(Duration::from_secs(2))
///     .with_max_wait(Duration::from_secs(300))
///     .with_cancel_token(cancel.clone());
///
/// assert_eq!(config.poll_interval(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollConfig {
    /// Delay between consecutive status queries in milliseconds (default: 5000)
    poll_interval_ms: Option<u64>,
    /// Cap on total wait time in milliseconds (default: none)
    max_wait_ms: Option<u64>,
    /// Cooperative cancellation for the wait loop; never sent to the server
    #[serde(skip)]
    cancel_token: Option<CancellationToken>,
}

impl PollConfig {
    /// Creates a configuration with the given poll interval and no wait cap.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval_ms: Some(poll_interval.as_millis() as u64),
            max_wait_ms: None,
            cancel_token: None,
        }
    }

    /// Caps the total time `wait_for_completion` may block.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait_ms = Some(max_wait.as_millis() as u64);
        self
    }

    /// Attaches a cancellation token observed at poll boundaries.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Get the delay between consecutive status queries
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(5_000))
    }

    /// Get the cap on total wait time, if configured
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_ms.map(Duration::from_millis)
    }

    /// Get the cancellation token, if configured
    pub fn cancel_token(&self) -> Option<&CancellationToken> {
        self.cancel_token.as_ref()
    }
}
