use serde::{Deserialize, Serialize};

/// One fetched batch of a paginated collection.
///
/// Items keep the exact order the server returned them in; neither the page
/// nor the walker re-sorts or de-duplicates. A page without a continuation
/// token is the last page of the sequence.
///
/// Pages are consumed and discarded as the walker advances - the memory
/// bound of a full iteration is one page, not the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in server-returned order
    pub items: Vec<T>,
    /// Opaque token for the next fetch; `None` on the last page
    pub continuation_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, continuation_token: Option<String>) -> Self {
        Self {
            items,
            continuation_token,
        }
    }

    /// Returns `true` when no further page exists after this one.
    pub fn is_last(&self) -> bool {
        self.continuation_token.is_none()
    }
}
