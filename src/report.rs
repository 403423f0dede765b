//! Read side: today vs yesterday comparison and its request handler

use crate::compare::{ComparisonResult, compare_rates};
use crate::core::outcome::{Outcome, StageError};
use crate::core::snapshot::Rates;
use crate::core::store::SnapshotStore;
use crate::core::timezone::{reference_dates, reference_now};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub const ALLOWED_METHOD: &str = "GET";

/// Inbound request envelope. Only the method matters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRequest {
    #[serde(rename = "httpMethod", default)]
    pub http_method: String,
}

impl ApiRequest {
    pub fn new(method: &str) -> Self {
        Self {
            http_method: method.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    fn json(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            body,
        }
    }

    fn message(status_code: u16, message: &str) -> Self {
        Self::json(status_code, serde_json::json!({ "message": message }).to_string())
    }

    pub fn method_not_allowed() -> Self {
        let mut response = Self::message(405, "Method Not Allowed");
        response
            .headers
            .insert("Allow".to_string(), ALLOWED_METHOD.to_string());
        response
    }

    pub fn internal_error() -> Self {
        Self::message(500, "Internal server error")
    }
}

async fn rates_for(store: &dyn SnapshotStore, date: NaiveDate) -> Outcome<Rates> {
    let snapshot = store
        .get(date)
        .await
        .map_err(|e| StageError::Store(format!("Failed to read snapshot for {date}: {e}")))?;
    if snapshot.is_none() {
        debug!("No snapshot stored for {}", date);
    }
    Ok(snapshot.map(|s| s.rates).unwrap_or_default())
}

/// Compares the reference-timezone "today" against "yesterday" as seen at `now`.
///
/// Missing snapshots give empty or partial results; only a failed read is an error.
#[instrument(name = "Compare", skip(store))]
pub async fn compare_days(
    store: &dyn SnapshotStore,
    now: DateTime<Utc>,
) -> Outcome<ComparisonResult> {
    let generated_at = reference_now(now);
    let (current_date, previous_date) = reference_dates(now);

    let current = rates_for(store, current_date).await?;
    let previous = rates_for(store, previous_date).await?;

    Ok(ComparisonResult {
        generated_at,
        current_date,
        previous_date,
        entries: compare_rates(&current, &previous),
    })
}

pub struct Reporter {
    store: Arc<dyn SnapshotStore>,
}

impl Reporter {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        self.handle_at(request, Utc::now()).await
    }

    /// Guards the method, then serves the comparison. Internal failures are
    /// logged in full and answered with a generic 500.
    pub async fn handle_at(&self, request: &ApiRequest, now: DateTime<Utc>) -> ApiResponse {
        if request.http_method != ALLOWED_METHOD {
            debug!("Rejecting {} request", request.http_method);
            return ApiResponse::method_not_allowed();
        }

        let result = match compare_days(self.store.as_ref(), now).await {
            Ok(result) => result,
            Err(e) => {
                error!(stage = e.stage(), error = %e, "Internal server error");
                return ApiResponse::internal_error();
            }
        };

        match serde_json::to_string(&result) {
            Ok(body) => ApiResponse::json(200, body),
            Err(e) => {
                error!(error = %e, "Failed to serialize comparison");
                ApiResponse::internal_error()
            }
        }
    }
}
