//! Normalized, immutable index time series

use crate::core::sample::IndexSample;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::debug;

/// Which upstream representation a series was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesOrigin {
    HtmlTable,
    Workbook,
}

impl Display for SeriesOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SeriesOrigin::HtmlTable => "html table",
                SeriesOrigin::Workbook => "workbook",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Entries are sorted ascending by date, dates are unique and values are
/// strictly positive. The series cannot be mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeries {
    points: Vec<IndexPoint>,
    origin: SeriesOrigin,
}

impl IndexSeries {
    /// Builds a series from raw samples, dropping malformed or non-positive
    /// ones. When several samples share a date the first one seen wins.
    pub fn from_samples<I>(samples: I, origin: SeriesOrigin) -> Self
    where
        I: IntoIterator<Item = IndexSample>,
    {
        let mut total = 0usize;
        let mut points: Vec<IndexPoint> = samples
            .into_iter()
            .inspect(|_| total += 1)
            .filter_map(|sample| sample.parse())
            .map(|(date, value)| IndexPoint { date, value })
            .collect();
        let parsed = points.len();

        // Stable sort keeps source order among equal dates
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);

        debug!(
            total,
            dropped = total - parsed,
            duplicates = parsed - points.len(),
            %origin,
            "Normalized index samples"
        );
        Self { points, origin }
    }

    pub fn origin(&self) -> SeriesOrigin {
        self.origin
    }

    pub fn points(&self) -> &[IndexPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&IndexPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&IndexPoint> {
        self.points.last()
    }

    /// Years among `years` without a single entry in the series.
    pub fn missing_years(&self, years: &BTreeSet<i32>) -> BTreeSet<i32> {
        let present: BTreeSet<i32> = self.points.iter().map(|p| p.date.year()).collect();
        years.difference(&present).copied().collect()
    }

    pub fn covers_years(&self, years: &BTreeSet<i32>) -> bool {
        self.missing_years(years).is_empty()
    }
}
