//! Polling driver for long-running operations.
//!
//! The poller owns one operation from submission to terminal state. It issues
//! no speculative or concurrent status queries, performs no retries of its
//! own, and never aborts the server-side operation - a timeout or a
//! cancellation stops client-side waiting only.

use super::errors::{PollerError, PollerResult};
use super::types::{Operation, OperationStatus, PollConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Service-specific calls the poller drives.
///
/// Implementations wrap the two external collaborators of a long-running
/// operation: the initiating call and the status query. Both are single
/// round trips; retry/backoff policy, if any, belongs to the transport
/// behind the implementation, not here.
///
/// # Examples
///
/// ```no_run
/// use client::operation::{Operation, OperationClient, PollerError};
/// use async_trait::async_trait;
///
/// struct MyClient;
///
/// #[async_trait]
/// impl OperationClient<serde_json::Value> for MyClient {
///     async fn initiate(&self) -> Result<Operation<serde_json::Value>, PollerError> {
///         // Submit the request, return the accepted operation handle
///         Ok(Operation::accepted("https://example.com/op/1".to_string(), None))
///     }
///
///     async fn fetch_status(
///         &self,
///         token: &str,
///     ) -> Result<Operation<serde_json::Value>, PollerError> {
///         // One status round trip for the given operation token
///         Ok(Operation::accepted(token.to_string(), None))
///     }
/// }
/// ```
#[async_trait]
pub trait OperationClient<R>: Send + Sync {
    /// Submits the initiating request.
    ///
    /// Invoked exactly once per poller, by [`OperationPoller::start`].
    ///
    /// # Errors
    ///
    /// Returns [`PollerError::Submission`] if the initiating request is
    /// rejected (malformed input, auth failure). This is distinct from a
    /// failed operation result.
    async fn initiate(&self) -> PollerResult<Operation<R>>;

    /// Issues one status query for the given operation token.
    ///
    /// # Errors
    ///
    /// Returns [`PollerError::PollQuery`] on transport or server failure of
    /// the query itself. The failure is transient from the poller's point of
    /// view; the caller may simply poll again.
    async fn fetch_status(&self, token: &str) -> PollerResult<Operation<R>>;
}

/// Drives one long-running operation from submission to terminal state.
///
/// One poller instance owns one logical operation; there is no internal
/// parallelism and no shared state between instances, so callers may run
/// any number of pollers concurrently.
///
/// The three entry points compose:
/// - [`poll`](Self::poll) for manual polling (progress displays),
/// - [`wait_for_completion`](Self::wait_for_completion) for a simple
///   blocking wait,
/// - [`get_final_result`](Self::get_final_result) once terminal.
pub struct OperationPoller<R> {
    client: Arc<dyn OperationClient<R>>,
    op: Operation<R>,
}

impl<R: std::fmt::Debug> std::fmt::Debug for OperationPoller<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationPoller")
            .field("op", &self.op)
            .finish_non_exhaustive()
    }
}

impl<R> OperationPoller<R> {
    /// Submits the operation and returns a poller tracking it.
    ///
    /// The initiating call is invoked exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`PollerError::Submission`] when the initiating call fails;
    /// in that case nothing is running server-side.
    pub async fn start(client: Arc<dyn OperationClient<R>>) -> PollerResult<Self> {
        let op = client.initiate().await?;
        log::info!("operation accepted: {}", op.token);
        Ok(Self { client, op })
    }

    /// Issues one status query and returns the refreshed snapshot.
    ///
    /// Never blocks beyond the single network round trip. Once a terminal
    /// state has been observed, further calls return the stored snapshot
    /// without touching the network (idempotent terminality).
    ///
    /// # Errors
    ///
    /// Returns [`PollerError::PollQuery`] if the status query itself fails.
    /// The operation snapshot is left unchanged; the caller may poll again.
    pub async fn poll(&mut self) -> PollerResult<&Operation<R>> {
        if self.op.is_terminal() {
            log::debug!(
                "operation {} already {}, skipping status query",
                self.op.token,
                self.op.status
            );
            return Ok(&self.op);
        }

        let next = self.client.fetch_status(&self.op.token).await?;
        if next.status != self.op.status {
            log::debug!(
                "operation {}: {} -> {}",
                self.op.token,
                self.op.status,
                next.status
            );
        }
        self.op = next;
        Ok(&self.op)
    }

    /// Polls until the operation reaches a terminal state.
    ///
    /// Status queries are spaced by the configured poll interval, measured
    /// from the start of the previous query - a slow query eats into the
    /// delay, and a query slower than the interval is followed immediately
    /// by the next one. A server-provided retry-after hint extends (never
    /// shortens) the delay.
    ///
    /// # Errors
    ///
    /// - [`PollerError::Timeout`] when the configured wait cap elapses
    /// - [`PollerError::Cancelled`] when the cancellation token fires; both
    ///   take effect at a poll boundary and leave the server-side operation
    ///   running
    /// - [`PollerError::PollQuery`] if a status query fails
    pub async fn wait_for_completion(
        &mut self,
        config: &PollConfig,
    ) -> PollerResult<&Operation<R>> {
        let interval = config.poll_interval();
        let started = Instant::now();
        let deadline = config.max_wait().map(|cap| started + cap);
        let cancel = config.cancel_token().cloned().unwrap_or_default();

        let mut last_query_took = Duration::ZERO;
        loop {
            if self.op.is_terminal() {
                return Ok(&self.op);
            }

            let spacing = self
                .op
                .retry_after
                .map_or(interval, |hint| hint.max(interval));
            let delay = spacing.saturating_sub(last_query_took);

            tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("wait on operation {} cancelled by caller", self.op.token);
                    return Err(PollerError::Cancelled);
                }
                _ = until(deadline) => {
                    let waited = started.elapsed();
                    log::warn!(
                        "gave up waiting on operation {} after {waited:?}",
                        self.op.token
                    );
                    return Err(PollerError::Timeout { waited });
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let query_started = Instant::now();
            self.poll().await?;
            last_query_took = query_started.elapsed();
        }
    }

    /// Returns the decoded success payload of a terminal operation.
    ///
    /// Valid only after [`OperationStatus::Succeeded`]; the payload comes
    /// from the last polled snapshot and nothing earlier.
    ///
    /// # Errors
    ///
    /// - [`PollerError::IllegalState`] before terminality
    /// - [`PollerError::OperationFailed`] carrying the verbatim server error
    ///   list when the operation failed
    /// - [`PollerError::Cancelled`] when the handle was cancelled client-side
    pub fn get_final_result(&self) -> PollerResult<&R> {
        match self.op.status {
            OperationStatus::Succeeded => self.op.result.as_ref().ok_or_else(|| {
                PollerError::IllegalState(
                    "operation succeeded but the status response carried no payload".to_string(),
                )
            }),
            OperationStatus::Failed => Err(PollerError::OperationFailed {
                details: self.op.errors.clone(),
            }),
            OperationStatus::Cancelled => Err(PollerError::Cancelled),
            OperationStatus::NotStarted | OperationStatus::InProgress => {
                Err(PollerError::IllegalState(
                    "final result requested before the operation reached a terminal state"
                        .to_string(),
                ))
            }
        }
    }

    /// Marks the tracked operation as cancelled, client-side only.
    ///
    /// The server-side operation keeps running; this merely stops the local
    /// state machine. Has no effect once a terminal state was observed.
    pub fn cancel(&mut self) {
        if !self.op.is_terminal() {
            log::info!("operation {} cancelled client-side", self.op.token);
            self.op.status = OperationStatus::Cancelled;
        }
    }

    /// Current snapshot of the tracked operation.
    pub fn operation(&self) -> &Operation<R> {
        &self.op
    }

    /// State observed by the most recent status query.
    pub fn status(&self) -> OperationStatus {
        self.op.status
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::types::ErrorDetail;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio_util::sync::CancellationToken;

    // Mock client replaying a scripted sequence of status snapshots
    struct ScriptedClient {
        script: Mutex<Vec<Operation<serde_json::Value>>>,
        initiate_count: AtomicU32,
        status_count: AtomicU32,
        fail_submission: bool,
    }

    impl ScriptedClient {
        fn new(script: Vec<Operation<serde_json::Value>>) -> Self {
            Self {
                script: Mutex::new(script),
                initiate_count: AtomicU32::new(0),
                status_count: AtomicU32::new(0),
                fail_submission: false,
            }
        }

        fn rejecting() -> Self {
            let mut client = Self::new(Vec::new());
            client.fail_submission = true;
            client
        }
    }

    fn snapshot(status: OperationStatus) -> Operation<serde_json::Value> {
        Operation {
            token: "https://example.com/op/42".to_string(),
            status,
            last_polled_at: Utc::now(),
            retry_after: None,
            result: None,
            errors: Vec::new(),
        }
    }

    #[async_trait]
    impl OperationClient<serde_json::Value> for ScriptedClient {
        async fn initiate(&self) -> PollerResult<Operation<serde_json::Value>> {
            self.initiate_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_submission {
                return Err(PollerError::Submission("bad request".to_string()));
            }
            Ok(Operation::accepted(
                "https://example.com/op/42".to_string(),
                None,
            ))
        }

        async fn fetch_status(&self, _token: &str) -> PollerResult<Operation<serde_json::Value>> {
            self.status_count.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(PollerError::PollQuery("script exhausted".to_string()));
            }
            Ok(script.remove(0))
        }
    }

    #[tokio::test]
    async fn start_invokes_initiate_exactly_once() {
        let client = Arc::new(ScriptedClient::new(vec![snapshot(
            OperationStatus::Succeeded,
        )]));
        let poller = OperationPoller::start(client.clone()).await.unwrap();
        assert_eq!(poller.status(), OperationStatus::NotStarted);
        assert_eq!(client.initiate_count.load(Ordering::SeqCst), 1);
        assert_eq!(client.status_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submission_failure_is_not_an_operation_failure() {
        let client = Arc::new(ScriptedClient::rejecting());
        let err = OperationPoller::start(client).await.unwrap_err();
        assert!(matches!(err, PollerError::Submission(_)));
    }

    #[tokio::test]
    async fn final_result_before_terminal_is_illegal_state() {
        let client = Arc::new(ScriptedClient::new(vec![snapshot(
            OperationStatus::InProgress,
        )]));
        let mut poller = OperationPoller::start(client).await.unwrap();
        assert!(matches!(
            poller.get_final_result(),
            Err(PollerError::IllegalState(_))
        ));

        poller.poll().await.unwrap();
        assert!(matches!(
            poller.get_final_result(),
            Err(PollerError::IllegalState(_))
        ));
    }

    #[tokio::test]
    async fn succeeded_result_comes_from_last_poll_only() {
        let mut stale = snapshot(OperationStatus::InProgress);
        stale.result = Some(serde_json::json!({"pages": 1}));
        let mut fresh = snapshot(OperationStatus::Succeeded);
        fresh.result = Some(serde_json::json!({"pages": 3}));

        let client = Arc::new(ScriptedClient::new(vec![stale, fresh]));
        let mut poller = OperationPoller::start(client).await.unwrap();
        poller.poll().await.unwrap();
        poller.poll().await.unwrap();

        assert_eq!(
            poller.get_final_result().unwrap(),
            &serde_json::json!({"pages": 3})
        );
    }

    #[tokio::test]
    async fn failed_operation_preserves_error_details_verbatim() {
        let mut failed = snapshot(OperationStatus::Failed);
        failed.errors = vec![ErrorDetail {
            code: "2003".to_string(),
            message: "Invalid image format".to_string(),
        }];

        let client = Arc::new(ScriptedClient::new(vec![failed]));
        let mut poller = OperationPoller::start(client).await.unwrap();
        poller.poll().await.unwrap();

        match poller.get_final_result() {
            Err(PollerError::OperationFailed { details }) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].code, "2003");
                assert_eq!(details[0].message, "Invalid image format");
            }
            other => panic!("expected OperationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn terminal_state_stops_status_queries() {
        let client = Arc::new(ScriptedClient::new(vec![snapshot(
            OperationStatus::Succeeded,
        )]));
        let mut poller = OperationPoller::start(client.clone()).await.unwrap();
        poller.poll().await.unwrap();
        assert_eq!(client.status_count.load(Ordering::SeqCst), 1);

        // Polling a terminal operation issues no further queries.
        poller.poll().await.unwrap();
        poller.poll().await.unwrap();
        assert_eq!(client.status_count.load(Ordering::SeqCst), 1);
        assert_eq!(poller.status(), OperationStatus::Succeeded);
    }

    #[tokio::test]
    async fn wait_for_completion_drives_to_success() {
        let mut done = snapshot(OperationStatus::Succeeded);
        done.result = Some(serde_json::json!({"pages": 3}));
        let client = Arc::new(ScriptedClient::new(vec![
            snapshot(OperationStatus::InProgress),
            done,
        ]));

        let mut poller = OperationPoller::start(client.clone()).await.unwrap();
        let config = PollConfig::new(Duration::from_millis(10));
        let op = poller.wait_for_completion(&config).await.unwrap();
        assert_eq!(op.status, OperationStatus::Succeeded);
        assert_eq!(client.status_count.load(Ordering::SeqCst), 2);
        assert_eq!(
            poller.get_final_result().unwrap(),
            &serde_json::json!({"pages": 3})
        );
    }

    #[tokio::test]
    async fn wait_respects_poll_interval_spacing() {
        let client = Arc::new(ScriptedClient::new(vec![
            snapshot(OperationStatus::InProgress),
            snapshot(OperationStatus::InProgress),
            snapshot(OperationStatus::Succeeded),
        ]));

        let mut poller = OperationPoller::start(client).await.unwrap();
        let interval = Duration::from_millis(50);
        let started = std::time::Instant::now();
        poller
            .wait_for_completion(&PollConfig::new(interval))
            .await
            .unwrap();

        // Three queries spaced by the interval: at least 3 * 50ms elapsed.
        assert!(started.elapsed() >= interval * 3);
    }

    #[tokio::test]
    async fn wait_times_out_and_leaves_operation_in_progress() {
        let client = Arc::new(ScriptedClient::new(vec![
            snapshot(OperationStatus::InProgress);
            100
        ]));

        let mut poller = OperationPoller::start(client).await.unwrap();
        let config = PollConfig::new(Duration::from_millis(10))
            .with_max_wait(Duration::from_millis(45));
        let err = poller.wait_for_completion(&config).await.unwrap_err();
        assert!(matches!(err, PollerError::Timeout { .. }));
        assert_eq!(poller.status(), OperationStatus::InProgress);
    }

    #[tokio::test]
    async fn cancel_signal_stops_waiting_at_poll_boundary() {
        let client = Arc::new(ScriptedClient::new(vec![
            snapshot(OperationStatus::InProgress);
            100
        ]));

        let mut poller = OperationPoller::start(client.clone()).await.unwrap();
        let cancel = CancellationToken::new();
        let config = PollConfig::new(Duration::from_millis(20))
            .with_cancel_token(cancel.clone());

        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            }
        });

        let started = std::time::Instant::now();
        let err = poller.wait_for_completion(&config).await.unwrap_err();
        assert!(matches!(err, PollerError::Cancelled));
        // Returns within one interval of the signal firing.
        assert!(started.elapsed() < Duration::from_millis(50 + 20 + 20));

        // No further status queries after the cancelled wait returned.
        let queries = client.status_count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(client.status_count.load(Ordering::SeqCst), queries);
    }

    #[tokio::test]
    async fn client_side_cancel_marks_handle_terminal() {
        let client = Arc::new(ScriptedClient::new(vec![snapshot(
            OperationStatus::InProgress,
        )]));
        let mut poller = OperationPoller::start(client.clone()).await.unwrap();
        poller.cancel();
        assert_eq!(poller.status(), OperationStatus::Cancelled);
        assert!(matches!(
            poller.get_final_result(),
            Err(PollerError::Cancelled)
        ));

        // Terminal after cancel: no further queries are issued.
        poller.poll().await.unwrap();
        assert_eq!(client.status_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retry_after_hint_extends_the_delay() {
        let mut hinted = snapshot(OperationStatus::InProgress);
        hinted.retry_after = Some(Duration::from_millis(80));
        let client = Arc::new(ScriptedClient::new(vec![
            hinted,
            snapshot(OperationStatus::Succeeded),
        ]));

        let mut poller = OperationPoller::start(client).await.unwrap();
        poller.poll().await.unwrap();

        let started = std::time::Instant::now();
        poller
            .wait_for_completion(&PollConfig::new(Duration::from_millis(10)))
            .await
            .unwrap();
        // The 80ms hint governs the delay before the final query.
        assert!(started.elapsed() >= Duration::from_millis(80));
    }
}
