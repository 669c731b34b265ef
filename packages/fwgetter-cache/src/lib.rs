pub mod manager;

#[cfg(feature = "concurrent")]
pub mod concurrent;

use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Key/value store for serialized upstream responses.
///
/// Entries written with a `ttl` stop being returned once it has elapsed.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, BoxError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), BoxError>;
    async fn remove(&self, key: &str) -> Result<(), BoxError>;
    async fn clear(&self) -> Result<(), BoxError>;
}

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentCache;
pub use manager::CacheManager;
