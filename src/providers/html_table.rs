use crate::core::error::IndexError;
use crate::core::sample::IndexSample;
use crate::core::series::{IndexSeries, SeriesOrigin};
use crate::core::source::IndexSource;
use crate::providers::http::HttpFetcher;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Reads the index from a published HTML page holding a single table whose
/// rows carry (date, value) in their first two cells.
pub struct HtmlTableSource {
    url: String,
    table_id: String,
    http: HttpFetcher,
}

impl HtmlTableSource {
    pub fn new(url: &str, table_id: &str, http: HttpFetcher) -> Self {
        HtmlTableSource {
            url: url.to_string(),
            table_id: table_id.to_string(),
            http,
        }
    }
}

fn selector(css: &str) -> Result<Selector, IndexError> {
    Selector::parse(css)
        .map_err(|e| IndexError::MalformedSource(format!("Invalid selector '{css}': {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extracts candidate samples from the table with id `table_id`. Rows with
/// fewer than two cells (headers, spacers) yield nothing.
pub fn parse_table(body: &str, table_id: &str) -> Result<Vec<IndexSample>, IndexError> {
    let document = Html::parse_document(body);
    let table_selector = selector(&format!("table[id=\"{table_id}\"]"))?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let table = document.select(&table_selector).next().ok_or_else(|| {
        IndexError::MalformedSource(format!("No table with id '{table_id}' in page"))
    })?;

    let samples: Vec<IndexSample> = table
        .select(&row_selector)
        .filter_map(|row| {
            let mut cells = row.select(&cell_selector);
            let date = cell_text(cells.next()?);
            let value = cell_text(cells.next()?);
            Some(IndexSample::new(date.as_str(), value.as_str()))
        })
        .collect();

    debug!(rows = samples.len(), "Parsed HTML table rows");
    Ok(samples)
}

#[async_trait]
impl IndexSource for HtmlTableSource {
    fn name(&self) -> &str {
        "html-table"
    }

    #[instrument(name = "HtmlTableFetch", skip(self, _years), fields(url = %self.url))]
    async fn fetch_series(&self, _years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError> {
        let body = self.http.get_text(&self.url).await?;
        let samples = parse_table(&body, &self.table_id)?;

        let series = IndexSeries::from_samples(samples, SeriesOrigin::HtmlTable);
        if series.is_empty() {
            return Err(IndexError::SourceUnavailable(format!(
                "Table '{}' at {} has no valid rows",
                self.table_id, self.url
            )));
        }
        Ok(series)
    }
}
