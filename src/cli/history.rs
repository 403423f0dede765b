use super::ui;
use crate::core::snapshot::ExchangeRateSnapshot;
use crate::core::store::SnapshotStore;
use anyhow::{Context, Result};
use chrono::{NaiveDate, SecondsFormat};
use comfy_table::{Cell, CellAlignment};

impl ExchangeRateSnapshot {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
        for (currency, rate) in &self.rates {
            table.add_row(vec![
                Cell::new(currency),
                Cell::new(rate).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }
}

/// Prints the stored snapshot for `date`.
pub async fn show(store: &dyn SnapshotStore, date: &str) -> Result<()> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?;

    let Some(snapshot) = store.get(date).await? else {
        println!("No snapshot stored for {date}.");
        return Ok(());
    };

    println!(
        "\n{} {}",
        ui::style_text(&format!("Snapshot {}", snapshot.date), ui::StyleType::Title),
        ui::style_text(
            &format!(
                "({}, written {})",
                snapshot.timezone,
                snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            ui::StyleType::Subtle
        )
    );
    if snapshot.rates.is_empty() {
        println!("{}", ui::style_text("No rates in this snapshot.", ui::StyleType::Error));
    } else {
        println!("{}", snapshot.display_as_table());
    }
    Ok(())
}

/// Lists every stored date with its currency count.
pub async fn history(store: &dyn SnapshotStore) -> Result<()> {
    let dates = store.dates().await?;
    if dates.is_empty() {
        println!("No snapshots stored yet.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Currencies")]);
    for date in dates {
        let count = store.get(date).await?.map(|s| s.rates.len());
        table.add_row(vec![
            Cell::new(date),
            ui::format_optional_cell(count, |c| c.to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}
