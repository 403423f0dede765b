//! Snapshot persistence abstractions

use crate::core::snapshot::ExchangeRateSnapshot;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] fjall::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("{0}")]
    Rejected(String),
}

/// Table of snapshots keyed by date.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Creates the record for `snapshot.date` or fully replaces the existing one.
    /// The write is durable once this returns.
    async fn put(&self, snapshot: &ExchangeRateSnapshot) -> Result<(), StoreError>;

    /// Reads the record for `date`. A missing record is `Ok(None)`, not an error.
    async fn get(&self, date: NaiveDate) -> Result<Option<ExchangeRateSnapshot>, StoreError>;

    /// Lists stored dates in ascending order.
    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError>;
}
