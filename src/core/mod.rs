//! Core business logic abstractions

pub mod config;
pub mod converter;
pub mod currency;
pub mod error;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use converter::{BitcoinConverter, RATE_UNAVAILABLE};
pub use currency::Currency;
pub use error::{ConvertError, ConvertResult};
pub use rate::{IndexQuote, PriceIndex, RateProvider};
