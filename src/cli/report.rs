use super::ui;
use crate::compare::ComparisonResult;
use crate::core::store::SnapshotStore;
use crate::report::compare_days;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use comfy_table::Cell;

impl ComparisonResult {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell(&self.current_date.to_string()),
            ui::header_cell(&self.previous_date.to_string()),
            ui::header_cell("Status"),
        ]);

        for (currency, entry) in &self.entries {
            table.add_row(vec![
                Cell::new(currency),
                ui::format_optional_cell(entry.current_rate, |r| r.to_string()),
                ui::format_optional_cell(entry.previous_rate, |r| r.to_string()),
                ui::status_cell(entry.status),
            ]);
        }

        table.to_string()
    }
}

pub async fn run(store: &dyn SnapshotStore, as_json: bool) -> Result<()> {
    // A failed read surfaces as an error here, never as an empty table
    let result = compare_days(store, Utc::now()).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "\n{} {}",
        ui::style_text("Reference rates (EUR)", ui::StyleType::Title),
        ui::style_text(
            &format!(
                "as of {}",
                result.generated_at.to_rfc3339_opts(SecondsFormat::Secs, false)
            ),
            ui::StyleType::Subtle
        )
    );

    if result.entries.is_empty() {
        println!("No rates stored for {}.", result.current_date);
        return Ok(());
    }

    println!("{}", result.display_as_table());
    Ok(())
}
