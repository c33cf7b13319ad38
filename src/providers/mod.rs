//! Index Source Adapter: upstream tiers, fallback and caching

pub mod annual;
pub mod caching;
pub mod history;
pub mod html_table;
pub mod http;
pub mod tiered;
pub mod workbook;

use crate::core::config::SourceConfig;
use crate::core::error::IndexError;
use crate::core::source::IndexSource;
use annual::AnnualWorkbookSource;
use caching::{CachingIndexSource, SeriesCache};
use history::HistoryWorkbookSource;
use html_table::HtmlTableSource;
use http::HttpFetcher;
use std::sync::Arc;
use std::time::Duration;
use tiered::TieredSource;

/// Default tier chain: HTML table, annual workbooks, history workbook.
pub fn tiered_source(config: &SourceConfig) -> Result<TieredSource, IndexError> {
    let http = HttpFetcher::new(config.timeout())?;

    let history = Arc::new(HistoryWorkbookSource::new(
        &config.history_url(),
        http.clone(),
    ));
    let html = HtmlTableSource::new(&config.html_url(), &config.table_id, http.clone());
    let annual = AnnualWorkbookSource::new(
        &config.annual_url_template(),
        http,
        config.annual_fallback,
        Some(Arc::clone(&history)),
    );

    let tiers: Vec<Arc<dyn IndexSource>> = vec![Arc::new(html), Arc::new(annual), history];
    Ok(TieredSource::new(tiers))
}

/// The tier chain behind a shared series cache.
pub fn build_source(
    config: &SourceConfig,
    cache: Arc<SeriesCache>,
    ttl: Duration,
) -> Result<CachingIndexSource<TieredSource>, IndexError> {
    Ok(CachingIndexSource::new(tiered_source(config)?, cache, ttl))
}
