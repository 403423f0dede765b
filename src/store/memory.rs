use crate::core::snapshot::ExchangeRateSnapshot;
use crate::core::store::{SnapshotStore, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory snapshot table, used for tests and ephemeral runs
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<BTreeMap<NaiveDate, ExchangeRateSnapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn put(&self, snapshot: &ExchangeRateSnapshot) -> Result<(), StoreError> {
        let mut table = self.inner.lock().await;
        debug!("Store PUT for date: {}", snapshot.date);
        table.insert(snapshot.date, snapshot.clone());
        Ok(())
    }

    async fn get(&self, date: NaiveDate) -> Result<Option<ExchangeRateSnapshot>, StoreError> {
        let table = self.inner.lock().await;
        let value = table.get(&date).cloned();
        if value.is_some() {
            debug!("Store HIT for date: {}", date);
        } else {
            debug!("Store MISS for date: {}", date);
        }
        Ok(value)
    }

    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        Ok(self.inner.lock().await.keys().copied().collect())
    }
}
