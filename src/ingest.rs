//! Fetch, parse and store pipeline

use crate::core::feed::FeedProvider;
use crate::core::outcome::{Outcome, StageError};
use crate::core::snapshot::{ExchangeRateSnapshot, Rates};
use crate::core::store::SnapshotStore;
use crate::core::timezone::REFERENCE_TZ_LABEL;
use crate::providers::parser::parse_feed;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, instrument};

/// Upserts the snapshot for `date`, stamped with `written_at`.
pub async fn write_snapshot(
    store: &dyn SnapshotStore,
    date: NaiveDate,
    rates: Rates,
    written_at: DateTime<Utc>,
) -> Outcome<ExchangeRateSnapshot> {
    let snapshot = ExchangeRateSnapshot::new(date, rates, REFERENCE_TZ_LABEL, written_at);
    store
        .put(&snapshot)
        .await
        .map_err(|e| StageError::Store(format!("Failed to write snapshot for {date}: {e}")))?;
    debug!("Stored {} rates for {}", snapshot.rates.len(), date);
    Ok(snapshot)
}

/// Runs fetch, parse and write in sequence. Every run is independent; running
/// twice for the same feed document leaves one record per date.
pub struct Ingestor<'a> {
    feed: &'a dyn FeedProvider,
    store: &'a dyn SnapshotStore,
    namespace: String,
}

impl<'a> Ingestor<'a> {
    pub fn new(feed: &'a dyn FeedProvider, store: &'a dyn SnapshotStore, namespace: &str) -> Self {
        Ingestor {
            feed,
            store,
            namespace: namespace.to_string(),
        }
    }

    pub async fn run(&self) -> Outcome<ExchangeRateSnapshot> {
        self.run_at(Utc::now()).await
    }

    /// Same as [`Ingestor::run`] with an explicit write instant.
    #[instrument(name = "Ingest", skip(self))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> Outcome<ExchangeRateSnapshot> {
        let document = self.feed.fetch_document().await?;
        let (date, rates) = parse_feed(&document, &self.namespace)?;
        write_snapshot(self.store, date, rates, now).await
    }

    /// Entry point for the scheduler. The event is opaque and only logged.
    pub async fn handle_event(&self, event: &serde_json::Value) -> Outcome<ExchangeRateSnapshot> {
        info!(event = %event, "Received ingest trigger");
        let outcome = self.run().await;
        match &outcome {
            Ok(snapshot) => info!(
                date = %snapshot.date,
                currencies = snapshot.rates.len(),
                "Stored exchange rate snapshot"
            ),
            Err(e) => error!(
                stage = e.stage(),
                status = ?e.code(),
                error = %e,
                "Exchange rate ingestion failed"
            ),
        }
        outcome
    }
}
