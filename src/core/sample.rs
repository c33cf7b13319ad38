use crate::core::locale::{parse_date, parse_decimal};
use chrono::NaiveDate;

/// A single cell as read from an upstream record, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl RawValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RawValue::Date(date) => Some(*date),
            RawValue::Text(text) => parse_date(text),
            RawValue::Number(_) | RawValue::Empty => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) if value.is_finite() => Some(*value),
            RawValue::Text(text) => parse_decimal(text),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        if text.trim().is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(text.to_string())
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(date: NaiveDate) -> Self {
        RawValue::Date(date)
    }
}

/// A candidate (date, value) pair extracted from a source record. It may be
/// malformed; only [`IndexSample::parse`] decides whether it is usable.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSample {
    pub date: RawValue,
    pub value: RawValue,
}

impl IndexSample {
    pub fn new(date: impl Into<RawValue>, value: impl Into<RawValue>) -> Self {
        Self {
            date: date.into(),
            value: value.into(),
        }
    }

    /// Returns the parsed pair when both fields are well formed and the
    /// value is strictly positive.
    pub fn parse(&self) -> Option<(NaiveDate, f64)> {
        let date = self.date.as_date()?;
        let value = self.value.as_number().filter(|v| *v > 0.0)?;
        Some((date, value))
    }
}
