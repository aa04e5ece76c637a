//! # Long-Running Operation Module
//!
//! Drives a server-side task that outlives a single request from submission
//! to a terminal state.
//!
//! ## Core Components
//!
//! - [`OperationPoller`] - Submits an operation and drives it to completion
//! - [`OperationClient`] - Seam for the service-specific initiate/status calls
//! - [`Operation`] / [`OperationStatus`] - Poll snapshots and the state machine
//! - [`PollConfig`] - Cadence, wait cap and cancellation for blocking waits
//! - [`PollerError`] - Error taxonomy for submission, polling and waiting
//!
//! ## Usage
//!
//! ```no_run
//! use client::operation::{OperationPoller, PollConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! async fn example(client: Arc<dyn client::operation::OperationClient<serde_json::Value>>)
//! -> Result<(), Box<dyn std::error::Error>> {
//!     let mut poller = OperationPoller::start(client).await?;
//!     let config = PollConfig::new(Duration::from_secs(5));
//!     poller.wait_for_completion(&config).await?;
//!     let result = poller.get_final_result()?;
//!     println!("operation produced: {result}");
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod poller;
pub mod types;

pub use errors::{PollerError, PollerResult};
pub use poller::{OperationClient, OperationPoller};
pub use types::{ErrorDetail, Operation, OperationStatus, PollConfig};
