//! Feed retrieval abstraction

use crate::core::outcome::Outcome;
use async_trait::async_trait;

#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Returns the raw feed document.
    async fn fetch_document(&self) -> Outcome<String>;
}
