use super::ui;
use crate::core::adjustment::{AdjustmentResult, next_adjustment_date};
use crate::core::service::AdjustmentService;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::Cell;

const DATE_FORMAT: &str = "%d/%m/%Y";

const MANUAL_HINT: &str = "Could not fetch or process the index. \
    Retry later, or enter both index values with the `manual` command";

/// Output of a dated or manual calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone)]
pub struct CalcArgs {
    pub base_amount: f64,
    pub date_old: NaiveDate,
    /// Defaults to `date_old` plus `months`.
    pub date_new: Option<NaiveDate>,
    pub months: u32,
    pub format: OutputFormat,
}

#[derive(Debug, Clone)]
pub struct ManualArgs {
    pub base_amount: f64,
    pub old_value: f64,
    pub new_value: f64,
    pub format: OutputFormat,
}

impl CalcArgs {
    pub fn resolved_date_new(&self) -> Result<NaiveDate> {
        match self.date_new {
            Some(date) => Ok(date),
            None => next_adjustment_date(self.date_old, self.months).ok_or_else(|| {
                anyhow!(
                    "Cannot add {} months to {}",
                    self.months,
                    self.date_old.format(DATE_FORMAT)
                )
            }),
        }
    }
}

fn date_label(query: Option<NaiveDate>, index_date: Option<NaiveDate>) -> String {
    match (query, index_date) {
        (Some(q), Some(i)) if q != i => format!(
            "{} (value of {})",
            q.format(DATE_FORMAT),
            i.format(DATE_FORMAT)
        ),
        (Some(q), _) => q.format(DATE_FORMAT).to_string(),
        (None, _) => String::new(),
    }
}

/// Renders the five reporting rows, rounded to two decimals.
pub fn display_as_table(
    result: &AdjustmentResult,
    date_old: Option<NaiveDate>,
    date_new: Option<NaiveDate>,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Concept"),
        ui::header_cell("Date"),
        ui::header_cell("Value"),
    ]);

    table.add_row(vec![
        Cell::new("Index (previous)"),
        Cell::new(date_label(date_old, result.old_index_date)),
        ui::value_cell(format!("{:.2}", result.old_value)),
    ]);
    table.add_row(vec![
        Cell::new("Index (new)"),
        Cell::new(date_label(date_new, result.new_index_date)),
        ui::value_cell(format!("{:.2}", result.new_value)),
    ]);
    table.add_row(vec![
        Cell::new("Increase %"),
        Cell::new(""),
        ui::change_cell(result.percent_change),
    ]);
    table.add_row(vec![
        Cell::new("Difference $"),
        Cell::new(""),
        ui::value_cell(ui::format_amount(result.absolute_difference)),
    ]);
    table.add_row(vec![
        Cell::new("New rent"),
        Cell::new(""),
        ui::value_cell(ui::format_amount(result.new_amount)),
    ]);

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Rent adjustment", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{} ${} ({:.2}%)\n{}",
        ui::style_text("Estimated new rent:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_amount(result.new_amount), ui::StyleType::TotalValue),
        result.percent_change,
        ui::style_text(
            "new = base x (index_new / index_previous); difference = new - base",
            ui::StyleType::Subtle
        )
    ));
    output
}

fn render(
    result: &AdjustmentResult,
    format: OutputFormat,
    date_old: Option<NaiveDate>,
    date_new: Option<NaiveDate>,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).context("Failed to serialize result")
        }
        OutputFormat::Table => Ok(display_as_table(result, date_old, date_new)),
    }
}

pub async fn run(service: &AdjustmentService, args: &CalcArgs) -> Result<()> {
    let date_new = args.resolved_date_new()?;

    let spinner = ui::new_spinner("Fetching index series...");
    let result = service
        .compute_adjustment(args.date_old, date_new, args.base_amount)
        .await;
    spinner.finish_and_clear();

    let result = result.context(MANUAL_HINT)?;
    println!(
        "{}",
        render(&result, args.format, Some(args.date_old), Some(date_new))?
    );
    Ok(())
}

pub fn run_manual(args: &ManualArgs) -> Result<()> {
    let result = AdjustmentService::compute_adjustment_from_values(
        args.old_value,
        args.new_value,
        args.base_amount,
    )?;
    println!("{}", render(&result, args.format, None, None)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_result() -> AdjustmentResult {
        AdjustmentResult {
            old_value: 450.0,
            new_value: 495.0,
            percent_change: 10.0,
            absolute_difference: 42_950.0,
            new_amount: 472_450.0,
            old_index_date: Some(date(2025, 5, 1)),
            new_index_date: Some(date(2025, 8, 29)),
        }
    }

    #[test]
    fn test_resolved_date_new_defaults_to_months() {
        let args = CalcArgs {
            base_amount: 1.0,
            date_old: date(2025, 5, 1),
            date_new: None,
            months: 4,
            format: OutputFormat::Table,
        };
        assert_eq!(args.resolved_date_new().unwrap(), date(2025, 9, 1));

        let explicit = CalcArgs {
            date_new: Some(date(2025, 11, 1)),
            ..args.clone()
        };
        assert_eq!(explicit.resolved_date_new().unwrap(), date(2025, 11, 1));

        let invalid = CalcArgs { months: 0, ..args };
        assert!(invalid.resolved_date_new().is_err());
    }

    #[test]
    fn test_table_contains_rounded_figures() {
        let output = display_as_table(
            &sample_result(),
            Some(date(2025, 5, 1)),
            Some(date(2025, 9, 1)),
        );
        assert!(output.contains("450.00"));
        assert!(output.contains("495.00"));
        assert!(output.contains("10.00%"));
        assert!(output.contains("42,950.00"));
        assert!(output.contains("472,450.00"));
    }

    #[test]
    fn test_date_label() {
        assert_eq!(
            date_label(Some(date(2025, 9, 1)), Some(date(2025, 8, 29))),
            "01/09/2025 (value of 29/08/2025)"
        );
        assert_eq!(
            date_label(Some(date(2025, 5, 1)), Some(date(2025, 5, 1))),
            "01/05/2025"
        );
        assert_eq!(date_label(None, None), "");
    }

    #[test]
    fn test_json_output() {
        let json = render(&sample_result(), OutputFormat::Json, None, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["new_amount"], 472_450.0);
        assert_eq!(value["old_index_date"], "2025-05-01");
    }

    #[test]
    fn test_manual_json_omits_index_dates() {
        let result =
            AdjustmentService::compute_adjustment_from_values(450.0, 495.0, 100.0).unwrap();
        let json = render(&result, OutputFormat::Json, None, None).unwrap();
        assert!(!json.contains("old_index_date"));
    }

    #[test]
    fn test_run_manual_rejects_zero_index() {
        let args = ManualArgs {
            base_amount: 100.0,
            old_value: 0.0,
            new_value: 495.0,
            format: OutputFormat::Table,
        };
        assert!(run_manual(&args).is_err());
    }
}
