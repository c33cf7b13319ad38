//! Index source abstraction

use crate::core::error::IndexError;
use crate::core::series::IndexSeries;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Dates this close to the start of a year also pull in the previous year,
/// so a nearest-prior lookup can land on late December entries.
const YEAR_START_MARGIN_DAYS: u32 = 7;

/// One upstream representation of the index, or a composition of them.
#[async_trait]
pub trait IndexSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches a validated series for `years`. Implementations may return
    /// more than was asked for.
    async fn fetch_series(&self, years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError>;
}

#[async_trait]
impl<T: IndexSource + ?Sized> IndexSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_series(&self, years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError> {
        (**self).fetch_series(years).await
    }
}

/// Calendar years a source must provide to resolve `dates`.
pub fn requested_years(dates: &[NaiveDate]) -> BTreeSet<i32> {
    let mut years = BTreeSet::new();
    for date in dates {
        years.insert(date.year());
        if date.ordinal() <= YEAR_START_MARGIN_DAYS {
            years.insert(date.year() - 1);
        }
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_years() {
        let may = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let sep = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(requested_years(&[may, sep]), BTreeSet::from([2025]));

        let next_year = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            requested_years(&[may, next_year]),
            BTreeSet::from([2025, 2026])
        );
    }

    #[test]
    fn test_requested_years_near_year_start() {
        let jan_3 = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert_eq!(requested_years(&[jan_3]), BTreeSet::from([2025, 2026]));

        let jan_8 = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        assert_eq!(requested_years(&[jan_8]), BTreeSet::from([2026]));
    }
}
