use crate::{BoxError, CacheBackend};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

/// Read-through cache in front of a [`CacheBackend`].
///
/// Backend failures are logged and treated as misses so a broken cache never
/// fails a request on its own.
pub struct CacheManager {
    backend: Box<dyn CacheBackend>,
    inflight: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CacheManager {
    pub fn new(backend: Box<dyn CacheBackend>) -> Self {
        Self {
            backend,
            inflight: StdMutex::new(HashMap::new()),
        }
    }

    #[cfg(feature = "concurrent")]
    pub fn new_concurrent() -> Self {
        use crate::concurrent::ConcurrentCache;
        Self::new(Box::new(ConcurrentCache::new()))
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if let Err(e) = self.backend.set(key, value, ttl).await {
            tracing::warn!(key, "cache write failed: {}", e);
        }
    }

    pub async fn remove(&self, key: &str) -> Result<(), BoxError> {
        self.backend.remove(key).await
    }

    pub async fn clear(&self) -> Result<(), BoxError> {
        self.backend.clear().await
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// At most one `fetch` per key runs at a time; callers arriving while it is
    /// in flight wait and then read what it stored. Errors are returned to the
    /// caller that ran the fetch and are not cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }

        let lock = self.inflight_lock(key);
        let result = {
            let _guard = lock.lock().await;
            match self.get(key).await {
                Some(value) => {
                    tracing::debug!(key, "cache filled while waiting");
                    Ok(value)
                }
                None => {
                    tracing::debug!(key, "cache miss, fetching");
                    let fetched = fetch().await;
                    if let Ok(value) = &fetched {
                        self.set(key, value, ttl).await;
                    }
                    fetched
                }
            }
        };
        self.release_inflight_lock(key, lock);
        result
    }

    fn inflight_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_inflight_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map plus ours means nobody else is waiting.
        if Arc::strong_count(&lock) <= 2 {
            inflight.remove(key);
        }
    }
}
