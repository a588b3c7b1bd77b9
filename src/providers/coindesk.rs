use crate::core::config::ProviderConfig;
use crate::core::{Currency, IndexQuote, PriceIndex, RateProvider};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const CURRENT_PRICE_PATH: &str = "/v1/bpi/currentprice.json";

/// Client for the CoinDesk bitcoin price index.
///
/// Every call issues exactly one GET to [`CURRENT_PRICE_PATH`]. Nothing is cached.
pub struct CoindeskProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoindeskProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("bitconv/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(base_url, client))
    }

    /// Uses a caller-supplied client, so connections can be shared with other code.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        CoindeskProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, CURRENT_PRICE_PATH)
    }

    async fn fetch_current_price(&self) -> Result<CurrentPriceResponse> {
        let url = self.url();
        debug!("Requesting current price from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} URL: {}", response.status(), url));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text from {url}"))?;

        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response from {}: {}", url, e))
    }

    /// Snapshot of every supported currency in one request.
    ///
    /// Currencies missing from the response, or with an unreadable rate, are left
    /// out of the snapshot rather than failing it.
    #[instrument(name = "CoindeskIndexFetch", skip(self))]
    pub async fn fetch_index(&self) -> Result<PriceIndex> {
        let data = self.fetch_current_price().await?;

        let mut quotes = HashMap::new();
        for currency in Currency::ALL {
            match data.quote(currency) {
                Ok(quote) => {
                    quotes.insert(currency, quote);
                }
                Err(e) => warn!("Skipping {} in index snapshot: {:#}", currency, e),
            }
        }

        Ok(PriceIndex {
            updated: data.updated(),
            quotes,
        })
    }
}

/// Only `bpi` must be an object. Entries and `time` stay untyped so that an odd
/// shape elsewhere in the body cannot hide the currency that was asked for.
#[derive(Debug, Deserialize)]
struct CurrentPriceResponse {
    #[serde(default)]
    time: Value,
    bpi: HashMap<String, Value>,
}

impl CurrentPriceResponse {
    fn quote(&self, currency: Currency) -> Result<IndexQuote> {
        let entry = self
            .bpi
            .get(currency.index_key())
            .ok_or_else(|| anyhow!("No rate data found for currency: {}", currency))?;
        let raw = entry
            .get("rate")
            .ok_or_else(|| anyhow!("Missing rate field for currency: {}", currency))?
            .as_str()
            .ok_or_else(|| anyhow!("Rate field for currency {} is not a string", currency))?;

        Ok(IndexQuote {
            rate: parse_rate(raw).with_context(|| format!("Invalid rate for {currency}"))?,
            description: entry
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    fn updated(&self) -> Option<DateTime<Utc>> {
        let raw = self.time.get("updatedISO")?.as_str()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                debug!("Ignoring unparsable update time '{}': {}", raw, e);
                None
            }
        }
    }
}

/// Parses a comma-grouped decimal such as `"11,486.5341"`.
fn parse_rate(raw: &str) -> Result<f64> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    let rate: f64 = digits
        .trim()
        .parse()
        .map_err(|e| anyhow!("Cannot parse '{}' as a number: {}", raw, e))?;

    if !rate.is_finite() || rate < 0.0 {
        return Err(anyhow!("Rate '{}' is not a non-negative number", raw));
    }
    Ok(rate)
}

#[async_trait]
impl RateProvider for CoindeskProvider {
    #[instrument(name = "CoindeskRateFetch", skip(self), fields(currency = %currency))]
    async fn get_rate(&self, currency: Currency) -> Result<f64> {
        let data = self.fetch_current_price().await?;
        let quote = data.quote(currency)?;
        debug!(rate = quote.rate, "Received rate");
        Ok(quote.rate)
    }
}
