//! Spreadsheet decoding and heuristic (date, value) column detection.
//!
//! Published workbooks do not have a fixed layout: the index may sit in any
//! column of any sheet, surrounded by titles, notes and other series. A
//! column is a date column when more than half of the sheet's rows parse
//! as dates, and a value column when more than half parse as numbers.

use crate::core::error::IndexError;
use crate::core::sample::{IndexSample, RawValue};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use tracing::debug;

static EMPTY_CELL: RawValue = RawValue::Empty;

/// A decoded worksheet: rows of raw cells. Rows may differ in length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<RawValue>>,
}

impl Sheet {
    pub fn new(name: &str, rows: Vec<Vec<RawValue>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }

    fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> &RawValue {
        self.rows[row].get(col).unwrap_or(&EMPTY_CELL)
    }

    fn count_valid(&self, col: usize, valid: impl Fn(&RawValue) -> bool) -> usize {
        (0..self.rows.len())
            .filter(|&row| valid(self.cell(row, col)))
            .count()
    }
}

fn best_column(
    sheet: &Sheet,
    valid: impl Fn(&RawValue) -> bool,
    exclude: Option<usize>,
) -> Option<usize> {
    let rows = sheet.rows.len();
    (0..sheet.width())
        .filter(|col| Some(*col) != exclude)
        .map(|col| (col, sheet.count_valid(col, &valid)))
        .filter(|(_, count)| *count * 2 > rows)
        // max_by_key keeps the last maximum; reversing the column index
        // makes ties resolve to the leftmost column
        .max_by_key(|(col, count)| (*count, std::cmp::Reverse(*col)))
        .map(|(col, _)| col)
}

/// Picks the (date, value) columns of a sheet. Among qualifying columns the
/// one with most valid cells wins; ties go to the leftmost.
pub fn classify_columns(sheet: &Sheet) -> Option<(usize, usize)> {
    let date_col = best_column(sheet, |cell| cell.as_date().is_some(), None)?;
    let value_col = best_column(sheet, |cell| cell.as_number().is_some(), Some(date_col))?;
    Some((date_col, value_col))
}

/// Candidate samples from a sheet, or nothing when no column pair is found.
pub fn sheet_samples(sheet: &Sheet) -> Vec<IndexSample> {
    let Some((date_col, value_col)) = classify_columns(sheet) else {
        debug!(sheet = %sheet.name, "No date/value columns found, skipping sheet");
        return Vec::new();
    };
    debug!(sheet = %sheet.name, date_col, value_col, "Classified sheet columns");

    (0..sheet.rows.len())
        .map(|row| IndexSample {
            date: sheet.cell(row, date_col).clone(),
            value: sheet.cell(row, value_col).clone(),
        })
        .collect()
}

fn raw_value(cell: &Data) -> RawValue {
    match cell {
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::String(s) | Data::DateTimeIso(s) => RawValue::from(s.as_str()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(RawValue::Empty, |dt| RawValue::Date(dt.date())),
        _ => RawValue::Empty,
    }
}

/// Decodes every sheet of an xls/xlsx/ods workbook. Sheets that fail to
/// load are skipped; an undecodable file is a [`IndexError::MalformedSource`].
pub fn decode_workbook(bytes: Vec<u8>) -> Result<Vec<Sheet>, IndexError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IndexError::MalformedSource(format!("Unreadable workbook: {e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let rows = range
                    .rows()
                    .map(|row| row.iter().map(raw_value).collect())
                    .collect();
                sheets.push(Sheet::new(&name, rows));
            }
            Err(e) => debug!(sheet = %name, "Skipping unreadable sheet: {}", e),
        }
    }
    Ok(sheets)
}

/// Union of the samples of every qualifying sheet in the workbook.
pub fn workbook_samples(bytes: Vec<u8>) -> Result<Vec<IndexSample>, IndexError> {
    Ok(decode_workbook(bytes)?
        .iter()
        .flat_map(sheet_samples)
        .collect())
}
