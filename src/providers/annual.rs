use crate::core::config::AnnualFallback;
use crate::core::error::IndexError;
use crate::core::sample::IndexSample;
use crate::core::series::{IndexSeries, SeriesOrigin};
use crate::core::source::IndexSource;
use crate::providers::history::HistoryWorkbookSource;
use crate::providers::http::HttpFetcher;
use crate::providers::workbook::workbook_samples;
use async_trait::async_trait;
use chrono::Datelike;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// One workbook per calendar year. Under [`AnnualFallback::PerYear`] years
/// that fail to load are filled from the history workbook.
pub struct AnnualWorkbookSource {
    /// URL template, `{year}` is substituted.
    url_template: String,
    http: HttpFetcher,
    fallback: AnnualFallback,
    history: Option<Arc<HistoryWorkbookSource>>,
}

impl AnnualWorkbookSource {
    pub fn new(
        url_template: &str,
        http: HttpFetcher,
        fallback: AnnualFallback,
        history: Option<Arc<HistoryWorkbookSource>>,
    ) -> Self {
        AnnualWorkbookSource {
            url_template: url_template.to_string(),
            http,
            fallback,
            history,
        }
    }

    fn url_for(&self, year: i32) -> String {
        self.url_template.replace("{year}", &year.to_string())
    }

    /// Valid samples of one year's workbook. A workbook without any usable
    /// sample counts as a failed year.
    #[instrument(name = "AnnualWorkbookFetch", skip(self))]
    async fn fetch_year(&self, year: i32) -> Result<Vec<IndexSample>, IndexError> {
        let url = self.url_for(year);
        let bytes = self.http.get_bytes(&url).await?;
        let samples: Vec<IndexSample> = workbook_samples(bytes)?
            .into_iter()
            .filter(|s| s.parse().is_some())
            .collect();
        if samples.is_empty() {
            return Err(IndexError::SourceUnavailable(format!(
                "Workbook for {year} at {url} has no valid samples"
            )));
        }
        Ok(samples)
    }

    /// History samples restricted to `years`.
    async fn history_samples(
        &self,
        years: &BTreeSet<i32>,
    ) -> Result<Vec<IndexSample>, IndexError> {
        let history = self.history.as_ref().ok_or_else(|| {
            IndexError::SourceUnavailable("No history workbook to fill missing years".to_string())
        })?;
        Ok(history
            .fetch_samples()
            .await?
            .into_iter()
            .filter(|s| s.parse().is_some_and(|(date, _)| years.contains(&date.year())))
            .collect())
    }
}

#[async_trait]
impl IndexSource for AnnualWorkbookSource {
    fn name(&self) -> &str {
        "annual-workbook"
    }

    async fn fetch_series(&self, years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError> {
        if years.is_empty() {
            return Err(IndexError::SourceUnavailable(
                "No years requested from annual workbooks".to_string(),
            ));
        }

        let results = join_all(years.iter().map(|year| async move {
            (*year, self.fetch_year(*year).await)
        }))
        .await;

        let mut samples = Vec::new();
        let mut failed = BTreeSet::new();
        let mut last_error = None;
        for (year, result) in results {
            match result {
                Ok(year_samples) => samples.extend(year_samples),
                Err(e) => {
                    debug!(year, "Annual workbook failed: {}", e);
                    failed.insert(year);
                    last_error = Some(e);
                }
            }
        }

        if let Some(error) = last_error {
            if failed.len() == years.len() || self.fallback == AnnualFallback::AllOrNothing {
                return Err(error);
            }
            warn!(?failed, "Filling years missing from annual workbooks with history");
            samples.extend(self.history_samples(&failed).await?);
        }

        Ok(IndexSeries::from_samples(samples, SeriesOrigin::Workbook))
    }
}
