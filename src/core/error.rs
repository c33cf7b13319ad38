//! Error taxonomy shared by the adapter, resolver and calculator

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Network or HTTP failure, or no tier produced a usable sample.
    #[error("Index source unavailable: {0}")]
    SourceUnavailable(String),

    /// An expected structural anchor (e.g. the data table) is missing.
    #[error("Malformed index source: {0}")]
    MalformedSource(String),

    #[error("No index value available for {date}: {reason}")]
    NoValueAvailable { date: NaiveDate, reason: String },

    #[error("Invalid index value: {0} (must be a positive number)")]
    InvalidIndexValue(f64),

    #[error("Invalid base amount: {0} (must be a non-negative number)")]
    InvalidAmount(f64),
}

impl IndexError {
    pub fn no_value(date: NaiveDate, reason: impl Into<String>) -> Self {
        IndexError::NoValueAvailable {
            date,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        IndexError::SourceUnavailable(err.to_string())
    }
}
