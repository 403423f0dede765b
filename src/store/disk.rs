use crate::core::snapshot::ExchangeRateSnapshot;
use crate::core::store::{SnapshotStore, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Snapshots persisted in a fjall partition named after the table, keyed by
/// the `YYYY-MM-DD` date and stored as JSON.
pub struct DiskSnapshotStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskSnapshotStore {
    pub fn open(path: &Path, table: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let partition = keyspace.open_partition(table, PartitionCreateOptions::default())?;
        debug!("Opened table '{}' at {}", table, path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

#[async_trait]
impl SnapshotStore for DiskSnapshotStore {
    async fn put(&self, snapshot: &ExchangeRateSnapshot) -> Result<(), StoreError> {
        let key = date_key(snapshot.date);
        let value = serde_json::to_vec(snapshot)?;
        let (keyspace, partition) = (self.keyspace.clone(), self.partition.clone());

        // The fsync runs on the blocking pool so readers on the runtime aren't stalled
        let written_key = key.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            partition.insert(written_key.as_bytes(), value)?;
            keyspace.persist(PersistMode::SyncAll)?;
            Ok(())
        })
        .await??;
        debug!("Store PUT for date: {}", key);
        Ok(())
    }

    async fn get(&self, date: NaiveDate) -> Result<Option<ExchangeRateSnapshot>, StoreError> {
        let key = date_key(date);
        match self.partition.get(key.as_bytes())? {
            Some(value) => {
                debug!("Store HIT for date: {}", key);
                Ok(Some(serde_json::from_slice(&value)?))
            }
            None => {
                debug!("Store MISS for date: {}", key);
                Ok(None)
            }
        }
    }

    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let mut dates = Vec::new();
        for entry in self.partition.iter() {
            let (key, _) = entry?;
            let key = String::from_utf8_lossy(&key).into_owned();
            let date = NaiveDate::parse_from_str(&key, DATE_KEY_FORMAT)
                .map_err(|_| StoreError::InvalidKey(key))?;
            dates.push(date);
        }
        // Zero-padded ISO keys iterate in date order already
        Ok(dates)
    }
}
