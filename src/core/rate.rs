use super::currency::Currency;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One currency's entry in a price index snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuote {
    pub rate: f64,
    pub description: Option<String>,
}

/// All rates reported by the price index in a single response.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    pub updated: Option<DateTime<Utc>>,
    pub quotes: HashMap<Currency, IndexQuote>,
}

impl PriceIndex {
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.quotes.get(&currency).map(|q| q.rate)
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Price of one bitcoin in `currency`, unrounded, as reported right now.
    async fn get_rate(&self, currency: Currency) -> Result<f64>;
}
