//! Exchange rate snapshot model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency code (e.g. `USD`) to rate against the feed's base currency.
///
/// The member set is whatever the feed published that day.
pub type Rates = BTreeMap<String, Decimal>;

/// One date's captured rates. At most one exists per `date`; a later write
/// for the same date replaces it entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    pub date: NaiveDate,
    pub timezone: String,
    pub rates: Rates,
    pub timestamp: DateTime<Utc>,
}

impl ExchangeRateSnapshot {
    pub fn new(date: NaiveDate, rates: Rates, timezone: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            date,
            timezone: timezone.to_string(),
            rates,
            timestamp,
        }
    }

    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }
}
