use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheValue<V> {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= Instant::now())
    }
}

/// In-memory cache with per-entry expiry. Lives for the process only.
///
/// [`MemoryCache::get_or_compute`] lets at most one computation run per key;
/// callers arriving during a miss wait for it and share the result.
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheValue<V>>>>,
    in_flight: Arc<Mutex<HashMap<K, Arc<Mutex<()>>>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached value for `key`, computing and storing it with
    /// `ttl` on a miss. Errors are returned to the caller and not cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: K,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let gate = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(
                in_flight
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let guard = gate.lock().await;

        // Another caller may have filled the entry while we waited
        let result = match self.get(&key).await {
            Some(value) => {
                debug!("Cache COALESCED for key: {:?}", key);
                Ok(value)
            }
            None => {
                let result = compute().await;
                if let Ok(value) = &result {
                    self.put(key.clone(), value.clone(), ttl).await;
                }
                result
            }
        };

        self.release_gate(&key, &gate).await;
        drop(guard);
        result
    }

    /// Drops the gate for `key` once no other caller holds or waits on it.
    /// Waiters keep it alive, so a failed computation hands over to the next
    /// waiter instead of letting a newcomer start a second one.
    async fn release_gate(&self, key: &K, gate: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // one reference in the map, one held by this caller
        if let Some(current) = in_flight.get(key)
            && Arc::ptr_eq(current, gate)
            && Arc::strong_count(gate) == 2
        {
            in_flight.remove(key);
        }
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.is_expired() => {
                debug!("Cache entry expired for key: {:?}", key);
                cache.remove(key);
                None
            }
            Some(entry) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let cache_value = CacheValue { value, expires_at };

        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, cache_value);
    }

    async fn remove(&self, key: &K) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {:?}", key);
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}
