pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::calc::{CalcArgs, ManualArgs};
use crate::core::config::AppConfig;
use crate::core::service::AdjustmentService;
use crate::providers::caching::SeriesCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Calc(CalcArgs),
    Manual(ManualArgs),
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ICL calculator starting...");

    match command {
        AppCommand::Calc(args) => {
            let config = load_config(config_path)?;

            let cache = Arc::new(SeriesCache::new());
            let source = providers::build_source(&config.source, cache, config.cache.ttl())?;
            let service = AdjustmentService::new(Arc::new(source), config.lookup.clone());

            cli::calc::run(&service, &args).await
        }
        AppCommand::Manual(args) => cli::calc::run_manual(&args),
    }
}
