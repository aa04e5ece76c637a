//! # Paged Sequence Module
//!
//! Presents one logical, possibly very large, ordered sequence of items
//! backed by repeated continuation-token fetches, without ever holding more
//! than one page in memory.
//!
//! ## Core Components
//!
//! - [`PagedWalker`] - Drives page fetches and exposes the item stream
//! - [`PageFetcher`] - Seam for the service-specific first/next page calls
//! - [`Page`] - One fetched batch with its optional continuation token
//! - [`PageError`] - Error taxonomy for fetches and rejected tokens

pub mod errors;
pub mod types;
pub mod walker;

pub use errors::{PageError, PageResult};
pub use types::Page;
pub use walker::{PageFetcher, PagedWalker};
