//! Nearest-prior date lookup over an [`IndexSeries`]

use crate::core::error::IndexError;
use crate::core::series::{IndexPoint, IndexSeries};
use chrono::{Duration, NaiveDate};

/// How far back from the query date a value may be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookBack {
    #[default]
    Unbounded,
    Days(u32),
}

impl From<Option<u32>> for LookBack {
    fn from(days: Option<u32>) -> Self {
        days.map_or(LookBack::Unbounded, LookBack::Days)
    }
}

/// Returns the entry with the largest date at or before `date`, provided it
/// lies within `look_back`.
pub fn resolve(
    series: &IndexSeries,
    date: NaiveDate,
    look_back: LookBack,
) -> Result<IndexPoint, IndexError> {
    let points = series.points();
    let idx = points.partition_point(|p| p.date <= date);
    if idx == 0 {
        let reason = match series.first() {
            Some(first) => format!("series starts on {}", first.date),
            None => "series is empty".to_string(),
        };
        return Err(IndexError::no_value(date, reason));
    }

    let point = points[idx - 1];
    if let LookBack::Days(days) = look_back
        && date - point.date > Duration::days(i64::from(days))
    {
        return Err(IndexError::no_value(
            date,
            format!(
                "nearest prior entry {} is more than {days} days back",
                point.date
            ),
        ));
    }
    Ok(point)
}
