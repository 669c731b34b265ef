use async_trait::async_trait;
use hyper::Uri;
use std::collections::HashMap;
use std::sync::Arc;

use crate::base_provider::{ProviderError, ReleaseProvider};
use crate::data::ReleaseRecord;

use fwgetter_cache::CacheManager;
use fwgetter_config::FirmwareConfig;
use fwgetter_utils::http::get;

const USER_AGENT: &str = "fwgetter";
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Lists releases of the configured GitHub repository.
///
/// Successful listings are cached for `cache_ttl_secs` under the key passed to
/// [`ReleaseProvider::fetch`].
pub struct GitHubReleaseProvider {
    config: FirmwareConfig,
    cache: Arc<CacheManager>,
}

impl GitHubReleaseProvider {
    pub fn new(config: FirmwareConfig) -> Self {
        Self::with_cache(config, Arc::new(CacheManager::new_concurrent()))
    }

    pub fn with_cache(config: FirmwareConfig, cache: Arc<CacheManager>) -> Self {
        GitHubReleaseProvider { config, cache }
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    fn request_headers(&self) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("Accept".to_string(), ACCEPT.to_string()),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ]);
        if let Some(token) = self.config.token() {
            map.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        map
    }

    async fn request_release_list(&self) -> Result<String, ProviderError> {
        let url = self.config.releases_url();
        let uri: Uri = url.parse().map_err(|e: hyper::http::uri::InvalidUri| {
            ProviderError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;

        let rsp = get(uri, &self.request_headers(), Some(self.config.http_timeout())).await?;
        if !rsp.is_ok() {
            tracing::warn!(%url, status = rsp.status, "release listing failed");
            return Err(ProviderError::Status {
                status: rsp.status,
            });
        }

        // Decode before caching so a broken listing is never served from cache.
        let releases: Vec<ReleaseRecord> = serde_json::from_slice(&rsp.body)?;
        tracing::debug!(%url, count = releases.len(), "fetched release listing");
        Ok(serde_json::to_string(&releases)?)
    }
}

#[async_trait]
impl ReleaseProvider for GitHubReleaseProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch(&self, cache_key: &str) -> Result<Vec<ReleaseRecord>, ProviderError> {
        let body = self
            .cache
            .get_or_fetch(cache_key, Some(self.config.cache_ttl()), || {
                self.request_release_list()
            })
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
