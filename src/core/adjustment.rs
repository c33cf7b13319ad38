//! Rent adjustment arithmetic

use crate::core::error::IndexError;
use chrono::{Months, NaiveDate};
use serde::Serialize;

/// Largest gap between adjustments accepted by [`next_adjustment_date`].
pub const MAX_ADJUSTMENT_MONTHS: u32 = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentResult {
    pub old_value: f64,
    pub new_value: f64,
    pub percent_change: f64,
    pub absolute_difference: f64,
    pub new_amount: f64,
    /// Date of the series entry `old_value` was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_index_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_index_date: Option<NaiveDate>,
}

pub fn validate_index_value(value: f64) -> Result<f64, IndexError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(IndexError::InvalidIndexValue(value))
    }
}

pub fn validate_amount(amount: f64) -> Result<f64, IndexError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(IndexError::InvalidAmount(amount))
    }
}

/// Computes the adjusted amount. No rounding is applied.
pub fn calculate(
    old_value: f64,
    new_value: f64,
    base_amount: f64,
) -> Result<AdjustmentResult, IndexError> {
    let old_value = validate_index_value(old_value)?;
    let new_value = validate_index_value(new_value)?;
    let base_amount = validate_amount(base_amount)?;

    let ratio = new_value / old_value;
    Ok(AdjustmentResult {
        old_value,
        new_value,
        percent_change: (ratio - 1.0) * 100.0,
        absolute_difference: base_amount * (new_value - old_value) / old_value,
        new_amount: base_amount * ratio,
        old_index_date: None,
        new_index_date: None,
    })
}

/// Date of the next adjustment `months` after `from`, clamped to the end
/// of the month (31 Jan + 1 month is 28/29 Feb).
pub fn next_adjustment_date(from: NaiveDate, months: u32) -> Option<NaiveDate> {
    if !(1..=MAX_ADJUSTMENT_MONTHS).contains(&months) {
        return None;
    }
    from.checked_add_months(Months::new(months))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_rent_increase() {
        let result = calculate(450.0, 495.0, 429_500.0).unwrap();
        assert_close(result.percent_change, 10.0);
        assert_close(result.absolute_difference, 42_950.0);
        assert_close(result.new_amount, 472_450.0);
        assert_eq!(result.old_value, 450.0);
        assert_eq!(result.new_value, 495.0);
    }

    #[test]
    fn test_new_amount_is_base_times_ratio() {
        for (old, new, base) in [
            (450.0, 495.0, 429_500.0),
            (17.3, 19.91, 1_000.0),
            (3.0, 2.5, 77.77),
            (1.0, 1.0, 0.0),
        ] {
            let result = calculate(old, new, base).unwrap();
            assert_eq!(result.new_amount, base * (new / old));
        }
    }

    #[test]
    fn test_no_change() {
        let result = calculate(450.0, 450.0, 429_500.0).unwrap();
        assert_eq!(result.percent_change, 0.0);
        assert_eq!(result.absolute_difference, 0.0);
        assert_eq!(result.new_amount, 429_500.0);
    }

    #[test]
    fn test_decrease() {
        let result = calculate(500.0, 450.0, 1_000.0).unwrap();
        assert_close(result.percent_change, -10.0);
        assert_close(result.absolute_difference, -100.0);
        assert_close(result.new_amount, 900.0);
    }

    #[test]
    fn test_invalid_index_values_are_rejected() {
        assert_eq!(
            calculate(0.0, 495.0, 100.0),
            Err(IndexError::InvalidIndexValue(0.0))
        );
        assert_eq!(
            calculate(450.0, -1.0, 100.0),
            Err(IndexError::InvalidIndexValue(-1.0))
        );
        assert!(matches!(
            calculate(f64::NAN, 1.0, 100.0),
            Err(IndexError::InvalidIndexValue(_))
        ));
    }

    #[test]
    fn test_invalid_amount_is_rejected() {
        assert_eq!(
            calculate(450.0, 495.0, -1.0),
            Err(IndexError::InvalidAmount(-1.0))
        );
        assert!(calculate(450.0, 495.0, 0.0).is_ok());
    }

    #[test]
    fn test_next_adjustment_date() {
        let may = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(
            next_adjustment_date(may, 4),
            NaiveDate::from_ymd_opt(2025, 9, 1)
        );

        let jan_end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            next_adjustment_date(jan_end, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );

        assert_eq!(next_adjustment_date(may, 0), None);
        assert_eq!(next_adjustment_date(may, 25), None);
    }
}
