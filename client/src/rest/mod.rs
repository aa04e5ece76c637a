//! # REST Bindings Module
//!
//! `reqwest`-backed implementations of the operation and page seams for
//! services following the common REST conventions: an `Operation-Location`
//! header on accepted submissions, `{"value": [...], "nextLink": ...}` list
//! envelopes, `{"error": {"code", "message"}}` error bodies and `Retry-After`
//! hints.
//!
//! The HTTP client is injected; connection pooling, TLS and retry policy are
//! the transport's concern, not this module's.

pub mod errors;
pub mod operation;
pub mod pages;

pub use operation::RestOperationClient;
pub use pages::{ListEnvelope, RestPageFetcher};
