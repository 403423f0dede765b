use super::ui;
use crate::core::feed::FeedProvider;
use crate::core::store::SnapshotStore;
use crate::ingest::Ingestor;
use anyhow::{Context, Result};

pub async fn run(
    feed: &dyn FeedProvider,
    store: &dyn SnapshotStore,
    namespace: &str,
    event: Option<&str>,
) -> Result<()> {
    let event: serde_json::Value = match event {
        Some(raw) => serde_json::from_str(raw).context("Failed to parse trigger event as JSON")?,
        None => serde_json::json!({ "source": "cli" }),
    };

    let pb = ui::new_spinner("Fetching reference rates...");
    let outcome = Ingestor::new(feed, store, namespace)
        .handle_event(&event)
        .await;
    pb.finish_and_clear();

    let snapshot = outcome?;
    println!(
        "{} {} rates for {}",
        ui::style_text("Stored", ui::StyleType::Success),
        snapshot.rates.len(),
        snapshot.date
    );
    Ok(())
}
