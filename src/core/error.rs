use thiserror::Error;

/// Outcomes of the converter that are not a usable amount.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    /// The caller supplied an unusable coin count.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The price index could not supply a rate.
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),
}

pub type ConvertResult<T> = Result<T, ConvertError>;
