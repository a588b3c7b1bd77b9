use super::ui;
use crate::core::{BitcoinConverter, Currency, RATE_UNAVAILABLE, RateProvider};
use anyhow::Result;
use tracing::info;

fn format_amount(amount: f64, currency: Currency) -> String {
    if amount == RATE_UNAVAILABLE {
        // Bare sentinel so scripts can match on it; the reason is logged
        return format!("{RATE_UNAVAILABLE}");
    }
    format!(
        "{} {}",
        ui::style_text(&amount.to_string(), ui::StyleType::Amount),
        currency
    )
}

/// Renders the current price of one bitcoin in `currency`.
pub async fn rate<P: RateProvider>(
    converter: &BitcoinConverter<P>,
    currency: Currency,
) -> Result<String> {
    let pb = ui::new_spinner("Fetching exchange rate...");
    let rate = converter.get_exchange_rate(currency).await;
    pb.finish_and_clear();

    info!(%currency, rate, "Exchange rate lookup finished");
    if rate == RATE_UNAVAILABLE {
        return Ok(format_amount(rate, currency));
    }
    Ok(format!("1 BTC = {}", format_amount(rate, currency)))
}

/// Renders the value of `coins` bitcoins in `currency`.
///
/// A negative or non-finite coin count is an error; an unavailable rate is not.
pub async fn convert<P: RateProvider>(
    converter: &BitcoinConverter<P>,
    currency: Currency,
    coins: f64,
) -> Result<String> {
    let pb = ui::new_spinner("Converting...");
    let result = converter.convert_bitcoins(currency, coins).await;
    pb.finish_and_clear();

    let amount = result?;
    info!(%currency, coins, amount, "Conversion finished");
    if amount == RATE_UNAVAILABLE {
        return Ok(format_amount(amount, currency));
    }
    Ok(format!("{coins} BTC = {}", format_amount(amount, currency)))
}
