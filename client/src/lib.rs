//! # Opdrive Client Library
//!
//! Client core for driving long-running server-side operations and
//! paginated listings against REST services. The library separates the
//! generic drivers (polling an operation to a terminal state, walking a
//! continuation-token page chain) from the wire bindings that talk to a
//! concrete service.
//!
//! ## Modules
//!
//! - [`operation`] - Long-running-operation polling: submission, single
//!   status queries and blocking wait-for-completion
//! - [`paging`] - Paged sequence walking over continuation tokens
//! - [`rest`] - `reqwest`-backed operation and page clients for
//!   Azure-convention REST endpoints
//! - [`common`] - Shared validation and error helpers

pub mod common;
pub mod operation;
pub mod paging;
pub mod rest;
