use crate::core::error::IndexError;
use crate::core::series::IndexSeries;
use crate::core::source::IndexSource;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tries each source in priority order and returns the first series that
/// covers every requested year.
///
/// A tier that fails, for any reason, hands over to the next one. A tier
/// that succeeds without covering every year is kept aside: when no tier
/// covers the request, the first such partial series is returned and the
/// resolver decides whether the missing dates matter.
pub struct TieredSource {
    tiers: Vec<Arc<dyn IndexSource>>,
}

impl TieredSource {
    pub fn new(tiers: Vec<Arc<dyn IndexSource>>) -> Self {
        TieredSource { tiers }
    }
}

#[async_trait]
impl IndexSource for TieredSource {
    fn name(&self) -> &str {
        "tiered"
    }

    async fn fetch_series(&self, years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError> {
        let mut failures = Vec::new();
        let mut partial: Option<(&str, IndexSeries)> = None;

        for tier in &self.tiers {
            debug!(tier = tier.name(), ?years, "Trying index tier");
            match tier.fetch_series(years).await {
                Ok(series) if series.covers_years(years) => {
                    info!(tier = tier.name(), entries = series.len(), "Index series loaded");
                    return Ok(series);
                }
                Ok(series) => {
                    let missing = series.missing_years(years);
                    debug!(tier = tier.name(), ?missing, "Tier does not cover requested years");
                    failures.push(format!("{}: no entries for {:?}", tier.name(), missing));
                    if partial.is_none() && !series.is_empty() {
                        partial = Some((tier.name(), series));
                    }
                }
                Err(e) => {
                    warn!(tier = tier.name(), "Index tier failed: {}", e);
                    failures.push(format!("{}: {}", tier.name(), e));
                }
            }
        }

        match partial {
            Some((name, series)) => {
                warn!(
                    tier = name,
                    ?years,
                    "No tier covers every requested year, using partial series"
                );
                Ok(series)
            }
            None => Err(IndexError::SourceUnavailable(format!(
                "All tiers failed ({})",
                failures.join("; ")
            ))),
        }
    }
}
