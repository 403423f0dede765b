//! Core business logic abstractions

pub mod config;
pub mod feed;
pub mod log;
pub mod outcome;
pub mod snapshot;
pub mod store;
pub mod timezone;

// Re-export main types for cleaner imports
pub use feed::FeedProvider;
pub use outcome::{Outcome, StageError};
pub use snapshot::{ExchangeRateSnapshot, Rates};
pub use store::{SnapshotStore, StoreError};
