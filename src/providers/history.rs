use crate::core::error::IndexError;
use crate::core::sample::IndexSample;
use crate::core::series::{IndexSeries, SeriesOrigin};
use crate::core::source::IndexSource;
use crate::providers::http::HttpFetcher;
use crate::providers::workbook::workbook_samples;
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::instrument;

/// Full-history workbook covering every published year.
pub struct HistoryWorkbookSource {
    url: String,
    http: HttpFetcher,
}

impl HistoryWorkbookSource {
    pub fn new(url: &str, http: HttpFetcher) -> Self {
        HistoryWorkbookSource {
            url: url.to_string(),
            http,
        }
    }

    /// Raw samples of the whole workbook.
    #[instrument(name = "HistoryWorkbookFetch", skip(self), fields(url = %self.url))]
    pub async fn fetch_samples(&self) -> Result<Vec<IndexSample>, IndexError> {
        let bytes = self.http.get_bytes(&self.url).await?;
        workbook_samples(bytes)
    }
}

#[async_trait]
impl IndexSource for HistoryWorkbookSource {
    fn name(&self) -> &str {
        "history-workbook"
    }

    async fn fetch_series(&self, _years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError> {
        let series = IndexSeries::from_samples(self.fetch_samples().await?, SeriesOrigin::Workbook);
        if series.is_empty() {
            return Err(IndexError::SourceUnavailable(format!(
                "History workbook at {} has no valid samples",
                self.url
            )));
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::workbook::testing::index_xlsx;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_for(response: ResponseTemplate) -> (MockServer, HistoryWorkbookSource) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/diar_icl.xlsx"))
            .respond_with(response)
            .mount(&server)
            .await;
        let http = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let source = HistoryWorkbookSource::new(&format!("{}/diar_icl.xlsx", server.uri()), http);
        (server, source)
    }

    #[tokio::test]
    async fn test_fetch_history_series() {
        let bytes = index_xlsx(&[
            ("31/12/2024", 400.0),
            ("01/05/2025", 450.0),
            ("01/09/2025", 495.0),
        ]);
        let (_server, source) = source_for(ResponseTemplate::new(200).set_body_bytes(bytes)).await;

        let series = source.fetch_series(&BTreeSet::new()).await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.origin(), SeriesOrigin::Workbook);
        assert_eq!(series.last().unwrap().value, 495.0);
    }

    #[tokio::test]
    async fn test_history_without_samples_is_unavailable() {
        let bytes = index_xlsx(&[]);
        let (_server, source) = source_for(ResponseTemplate::new(200).set_body_bytes(bytes)).await;
        let result = source.fetch_series(&BTreeSet::new()).await;
        assert!(matches!(result, Err(IndexError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_history_not_found() {
        let (_server, source) = source_for(ResponseTemplate::new(404)).await;
        let result = source.fetch_series(&BTreeSet::new()).await;
        assert!(matches!(result, Err(IndexError::SourceUnavailable(_))));
    }
}
