//! Text normalization for localized numbers and dates.
//!
//! The published series uses a comma as decimal separator and day-first
//! dates. Keeping these helpers free of any fetch logic lets other locales
//! be added here alone.

use chrono::{Datelike, NaiveDate};

/// Day-first formats are tried before ISO ones.
const DATE_FORMATS: [&str; 6] = [
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%Y-%m-%d", "%Y/%m/%d",
];

/// Converts a localized decimal string into the `.`-separated form `f64`
/// parsing expects.
///
/// A comma is the decimal separator. When a comma is present any `.` is
/// taken as a thousands separator, so `1.234,56` becomes `1234.56`.
pub fn normalize_decimal(text: &str) -> String {
    let compact: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();

    if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    }
}

pub fn parse_decimal(text: &str) -> Option<f64> {
    let normalized = normalize_decimal(text);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a calendar date, ignoring a trailing time part such as
/// `2025-05-01 00:00:00` or `2025-05-01T00:00:00`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.split_whitespace().next()?.split('T').next()?;
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        // `%Y` also accepts two digits; leave those to `%y`
        .find(|date| date.year() >= 1000)
}
