use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use iclcalc::cli::calc::{CalcArgs, ManualArgs, OutputFormat};
use iclcalc::core::adjustment::MAX_ADJUSTMENT_MONTHS;
use iclcalc::core::locale::parse_date;
use iclcalc::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_date_arg(text: &str) -> Result<NaiveDate, String> {
    parse_date(text).ok_or_else(|| format!("invalid date '{text}', use DD/MM/YYYY or YYYY-MM-DD"))
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Update a rent using the published index at two dates
    Calc {
        /// Rent amount set at the previous adjustment
        #[arg(short, long)]
        base: f64,
        /// Date of the previous adjustment
        #[arg(short, long, value_parser = parse_date_arg)]
        from: NaiveDate,
        /// Date of the new adjustment [default: FROM plus MONTHS]
        #[arg(short, long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
        /// Months between adjustments, used when --to is omitted
        #[arg(short, long, default_value_t = 4,
              value_parser = clap::value_parser!(u32).range(1..=MAX_ADJUSTMENT_MONTHS as i64))]
        months: u32,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a rent from index values entered by hand
    Manual {
        /// Rent amount set at the previous adjustment
        #[arg(short, long)]
        base: f64,
        /// Index value at the previous adjustment
        #[arg(long)]
        old_index: f64,
        /// Index value at the new adjustment
        #[arg(long)]
        new_index: f64,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl From<Commands> for iclcalc::AppCommand {
    fn from(cmd: Commands) -> iclcalc::AppCommand {
        match cmd {
            Commands::Calc {
                base,
                from,
                to,
                months,
                json,
            } => iclcalc::AppCommand::Calc(CalcArgs {
                base_amount: base,
                date_old: from,
                date_new: to,
                months,
                format: output_format(json),
            }),
            Commands::Manual {
                base,
                old_index,
                new_index,
                json,
            } => iclcalc::AppCommand::Manual(ManualArgs {
                base_amount: base,
                old_value: old_index,
                new_value: new_index,
                format: output_format(json),
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => iclcalc::cli::setup::run(),
        Some(cmd) => iclcalc::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
