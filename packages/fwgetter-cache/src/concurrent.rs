use crate::{BoxError, CacheBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// In-process cache backed by a `RwLock<HashMap>`.
///
/// Expired entries are dropped lazily on the next read of their key.
pub struct ConcurrentCache {
    data: RwLock<HashMap<String, CacheEntry>>,
}

impl Default for ConcurrentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentCache {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for ConcurrentCache {
    async fn get(&self, key: &str) -> Result<Option<String>, BoxError> {
        let now = Instant::now();
        {
            let data = self.data.read().await;
            match data.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        let mut data = self.data.write().await;
        // Re-check under the write lock, a writer may have refreshed the entry.
        match data.get(key) {
            Some(entry) if !entry.is_expired(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                data.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), BoxError> {
        let mut data = self.data.write().await;
        data.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BoxError> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), BoxError> {
        let mut data = self.data.write().await;
        data.clear();
        Ok(())
    }
}
