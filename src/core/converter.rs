//! Bitcoin to fiat conversion on top of a [`RateProvider`].
//!
//! Two surfaces are offered. [`BitcoinConverter::exchange_rate`] and
//! [`BitcoinConverter::convert`] report failures as [`ConvertError`].
//! [`BitcoinConverter::get_exchange_rate`] and [`BitcoinConverter::convert_bitcoins`]
//! collapse every fetch failure into [`RATE_UNAVAILABLE`] and only surface
//! [`ConvertError::InvalidArgument`].

use super::currency::Currency;
use super::error::{ConvertError, ConvertResult};
use super::rate::RateProvider;
use tracing::{debug, instrument, warn};

/// Sentinel returned when no rate could be obtained.
pub const RATE_UNAVAILABLE: f64 = -1.0;

/// Number of fractional digits kept in rates and converted amounts.
pub const DECIMAL_PLACES: i32 = 4;

/// Rounds half away from zero to `places` fractional digits.
pub fn round_to_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub struct BitcoinConverter<P: RateProvider> {
    provider: P,
}

impl<P: RateProvider> BitcoinConverter<P> {
    pub fn new(provider: P) -> Self {
        BitcoinConverter { provider }
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Current rate for `currency`, rounded to [`DECIMAL_PLACES`].
    #[instrument(name = "ExchangeRate", skip(self), fields(currency = %currency))]
    pub async fn exchange_rate(&self, currency: Currency) -> ConvertResult<f64> {
        let rate = self.provider.get_rate(currency).await.map_err(|e| {
            warn!("Rate fetch failed for {}: {:#}", currency, e);
            ConvertError::RateUnavailable(format!("{e:#}"))
        })?;

        if !rate.is_finite() || rate < 0.0 {
            return Err(ConvertError::RateUnavailable(format!(
                "Index reported an invalid rate for {currency}: {rate}"
            )));
        }

        let rounded = round_to_places(rate, DECIMAL_PLACES);
        debug!(rate = rounded, "Fetched exchange rate");
        Ok(rounded)
    }

    /// Value of `coins` bitcoins in `currency`, rounded to [`DECIMAL_PLACES`].
    ///
    /// The coin count is validated before any request is made. A zero rate is
    /// reported as unavailable. A count whose value overflows `f64` is rejected
    /// as an invalid argument.
    #[instrument(name = "Convert", skip(self), fields(currency = %currency))]
    pub async fn convert(&self, currency: Currency, coins: f64) -> ConvertResult<f64> {
        validate_coins(coins)?;

        let rate = self.exchange_rate(currency).await?;
        if rate <= 0.0 {
            return Err(ConvertError::RateUnavailable(format!(
                "Index reported a non-positive rate for {currency}"
            )));
        }

        let amount = coins * rate;
        if !amount.is_finite() {
            return Err(ConvertError::InvalidArgument(format!(
                "Number of coins is too large to convert, got {coins}"
            )));
        }

        Ok(round_to_places(amount, DECIMAL_PLACES))
    }

    /// Like [`Self::exchange_rate`], but returns [`RATE_UNAVAILABLE`] on any failure.
    pub async fn get_exchange_rate(&self, currency: Currency) -> f64 {
        self.exchange_rate(currency).await.unwrap_or(RATE_UNAVAILABLE)
    }

    /// Like [`Self::convert`], but a failed fetch yields `Ok(RATE_UNAVAILABLE)`.
    /// Only [`ConvertError::InvalidArgument`] is returned as an error.
    pub async fn convert_bitcoins(&self, currency: Currency, coins: f64) -> ConvertResult<f64> {
        match self.convert(currency, coins).await {
            Err(ConvertError::RateUnavailable(_)) => Ok(RATE_UNAVAILABLE),
            other => other,
        }
    }
}

fn validate_coins(coins: f64) -> ConvertResult<()> {
    if !coins.is_finite() {
        return Err(ConvertError::InvalidArgument(format!(
            "Number of coins must be a finite number, got {coins}"
        )));
    }
    if coins < 0.0 {
        return Err(ConvertError::InvalidArgument(format!(
            "Number of coins should be positive, got {coins}"
        )));
    }
    Ok(())
}
