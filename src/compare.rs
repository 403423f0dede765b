//! Day-over-day rate comparison

use crate::core::snapshot::Rates;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateStatus {
    High,
    Low,
    Equal,
    NotAvailable,
}

impl Display for RateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateStatus::High => "high",
                RateStatus::Low => "low",
                RateStatus::Equal => "equal",
                RateStatus::NotAvailable => "not_available",
            }
        )
    }
}

/// Compares two optional rates. Total over every input: a missing side gives
/// `NotAvailable`, otherwise the numeric ordering decides.
pub fn rate_status(current: Option<Decimal>, previous: Option<Decimal>) -> RateStatus {
    match (current, previous) {
        (Some(current), Some(previous)) => match current.cmp(&previous) {
            std::cmp::Ordering::Greater => RateStatus::High,
            std::cmp::Ordering::Less => RateStatus::Low,
            std::cmp::Ordering::Equal => RateStatus::Equal,
        },
        _ => RateStatus::NotAvailable,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateComparison {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub current_rate: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub previous_rate: Option<Decimal>,
    pub status: RateStatus,
}

fn serialize_instant<S: Serializer>(
    instant: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::AutoSi, false))
}

/// Per-request comparison of two days. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    #[serde(rename = "timestamp_cet", serialize_with = "serialize_instant")]
    pub generated_at: DateTime<FixedOffset>,
    pub current_date: NaiveDate,
    pub previous_date: NaiveDate,
    #[serde(rename = "exchange_rates")]
    pub entries: BTreeMap<String, RateComparison>,
}

/// Builds one entry per currency present in `current`. Currencies only found
/// in `previous` are left out.
pub fn compare_rates(current: &Rates, previous: &Rates) -> BTreeMap<String, RateComparison> {
    current
        .iter()
        .map(|(currency, rate)| {
            let current_rate = Some(*rate);
            let previous_rate = previous.get(currency).copied();
            (
                currency.clone(),
                RateComparison {
                    current_rate,
                    previous_rate,
                    status: rate_status(current_rate, previous_rate),
                },
            )
        })
        .collect()
}
