use super::ui;
use crate::core::{Currency, PriceIndex};
use crate::providers::CoindeskProvider;
use anyhow::Result;
use comfy_table::Cell;

pub fn render_index(index: &PriceIndex) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Description"),
        ui::header_cell("Rate (per BTC)"),
    ]);

    for currency in Currency::ALL {
        let quote = index.quotes.get(&currency);
        let description = quote
            .and_then(|q| q.description.as_deref())
            .unwrap_or("");
        table.add_row(vec![
            Cell::new(currency.code()),
            Cell::new(description),
            ui::rate_cell(quote.map(|q| q.rate)),
        ]);
    }

    let updated = index
        .updated
        .map_or("unknown".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());

    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Bitcoin Price Index", ui::StyleType::Title),
        table,
        ui::style_text(&format!("Updated: {updated}"), ui::StyleType::Subtle)
    )
}

/// Fetches the whole index once and renders it as a table.
pub async fn run(provider: &CoindeskProvider) -> Result<String> {
    let pb = ui::new_spinner("Fetching price index...");
    let index = provider.fetch_index().await;
    pb.finish_and_clear();

    match index {
        Ok(index) => Ok(render_index(&index)),
        Err(e) => {
            tracing::warn!("Price index unavailable: {:#}", e);
            Ok(ui::style_text("Price index unavailable", ui::StyleType::Error))
        }
    }
}
