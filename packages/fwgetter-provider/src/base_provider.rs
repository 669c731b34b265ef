use async_trait::async_trait;
use fwgetter_utils::HttpError;
use thiserror::Error;

use crate::data::ReleaseRecord;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid upstream url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("upstream request failed: {0}")]
    Http(#[from] HttpError),

    #[error("upstream returned status {status}")]
    Status { status: u16 },

    #[error("failed to decode release listing: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read release listing: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of the upstream release listing.
///
/// Implementations decide how `cache_key` is used; the GitHub provider keys
/// its read-through cache with it.
#[async_trait]
pub trait ReleaseProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, cache_key: &str) -> Result<Vec<ReleaseRecord>, ProviderError>;
}
