pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::SnapshotStore;
use anyhow::{Context, Result};
use disk::DiskSnapshotStore;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static SHARED_STORE: OnceCell<Arc<dyn SnapshotStore>> = OnceCell::const_new();

/// Opens the on-disk table named in `config`.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn SnapshotStore>> {
    let path = config.default_data_path()?.join("store");
    let store = DiskSnapshotStore::open(&path, &config.store.table)
        .with_context(|| format!("Failed to open table '{}'", config.store.table))?;
    info!(table = %config.store.table, path = %path.display(), "Opened snapshot store");
    Ok(Arc::new(store))
}

/// Process-wide store handle. The first caller's config opens it; every later
/// call in the process reuses the same handle.
pub async fn shared_store(config: &AppConfig) -> Result<Arc<dyn SnapshotStore>> {
    SHARED_STORE
        .get_or_try_init(|| async { open_store(config) })
        .await
        .cloned()
}
