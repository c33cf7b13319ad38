use crate::core::cache::Cache;
use crate::core::error::IndexError;
use crate::core::series::IndexSeries;
use crate::core::source::IndexSource;
use crate::store::memory::MemoryCache;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The series is cached under a single key for the freshness window,
/// whatever years were requested.
pub const SERIES_CACHE_KEY: &str = "index-series";

/// A cached series together with the years it was fetched for.
#[derive(Debug)]
pub struct CachedSeries {
    requested: BTreeSet<i32>,
    series: IndexSeries,
}

impl CachedSeries {
    /// Whether fetching again for `years` could improve on this entry. A
    /// fetch already made for every one of `years` cannot.
    fn is_stale_for(&self, years: &BTreeSet<i32>) -> bool {
        !self.series.covers_years(years) && !self.requested.is_superset(years)
    }
}

pub type SeriesCache = MemoryCache<String, Arc<CachedSeries>>;

/// Serves the inner source's series from a shared cache for `ttl`.
/// Concurrent misses share one fetch.
pub struct CachingIndexSource<T: IndexSource> {
    inner: T,
    cache: Arc<SeriesCache>,
    ttl: Duration,
}

impl<T: IndexSource> CachingIndexSource<T> {
    pub fn new(inner: T, cache: Arc<SeriesCache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    async fn cached_or_fetch(
        &self,
        years: &BTreeSet<i32>,
    ) -> Result<Arc<CachedSeries>, IndexError> {
        let key = SERIES_CACHE_KEY.to_string();
        self.cache
            .get_or_compute(key, Some(self.ttl), || async {
                let series = self.inner.fetch_series(years).await?;
                Ok(Arc::new(CachedSeries {
                    requested: years.clone(),
                    series,
                }))
            })
            .await
    }
}

#[async_trait]
impl<T: IndexSource> IndexSource for CachingIndexSource<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_series(&self, years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError> {
        let entry = self.cached_or_fetch(years).await?;
        if !entry.is_stale_for(years) {
            return Ok(entry.series.clone());
        }

        // Cached data was fetched for other years; fetch once more
        debug!(
            ?years,
            cached = ?entry.requested,
            "Cached series does not cover requested years, refreshing"
        );
        self.cache.remove(&SERIES_CACHE_KEY.to_string()).await;
        let entry = self.cached_or_fetch(years).await?;
        Ok(entry.series.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sample::IndexSample;
    use crate::core::series::SeriesOrigin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockInnerSource {
        call_count: AtomicUsize,
    }

    impl MockInnerSource {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl<'a> IndexSource for &'a MockInnerSource {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_series(&self, years: &BTreeSet<i32>) -> Result<IndexSeries, IndexError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if years.contains(&1999) {
                return Err(IndexError::SourceUnavailable("offline".to_string()));
            }
            // years after 2030 are not published yet
            let samples = years
                .iter()
                .filter(|year| **year <= 2030)
                .map(|year| IndexSample::new(format!("{year}-06-01").as_str(), "100"));
            Ok(IndexSeries::from_samples(samples, SeriesOrigin::HtmlTable))
        }
    }

    fn caching(inner: &MockInnerSource, ttl: Duration) -> CachingIndexSource<&MockInnerSource> {
        CachingIndexSource::new(inner, Arc::new(SeriesCache::new()), ttl)
    }

    #[tokio::test]
    async fn test_series_is_cached() {
        let inner = MockInnerSource::new();
        let source = caching(&inner, Duration::from_secs(60));

        let first = source.fetch_series(&BTreeSet::from([2025])).await.unwrap();
        let second = source.fetch_series(&BTreeSet::from([2025])).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_series_is_refetched() {
        let inner = MockInnerSource::new();
        let source = caching(&inner, Duration::from_millis(10));

        source.fetch_series(&BTreeSet::from([2025])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        source.fetch_series(&BTreeSet::from([2025])).await.unwrap();

        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_uncovered_years_trigger_refetch() {
        let inner = MockInnerSource::new();
        let source = caching(&inner, Duration::from_secs(60));

        source.fetch_series(&BTreeSet::from([2025])).await.unwrap();
        let series = source
            .fetch_series(&BTreeSet::from([2024, 2025]))
            .await
            .unwrap();

        assert!(series.covers_years(&BTreeSet::from([2024, 2025])));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);

        // the refreshed series now serves the narrower request too
        source.fetch_series(&BTreeSet::from([2024])).await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unpublished_year_is_served_from_cache() {
        let inner = MockInnerSource::new();
        let source = caching(&inner, Duration::from_secs(60));
        let years = BTreeSet::from([2025, 2031]);

        for _ in 0..3 {
            let series = source.fetch_series(&years).await.unwrap();
            assert!(!series.covers_years(&years));
        }
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        // a narrower request is answered by the same entry
        source.fetch_series(&BTreeSet::from([2025])).await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let inner = MockInnerSource::new();
        let source = caching(&inner, Duration::from_secs(60));

        assert!(source.fetch_series(&BTreeSet::from([1999])).await.is_err());
        assert!(source.fetch_series(&BTreeSet::from([1999])).await.is_err());
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }
}
