use async_trait::async_trait;
use std::path::Path;

use crate::base_provider::{ProviderError, ReleaseProvider};
use crate::data::ReleaseRecord;

/// Serves a fixed release listing, e.g. one saved from the GitHub API.
#[derive(Debug, Clone, Default)]
pub struct StaticReleaseProvider {
    releases: Vec<ReleaseRecord>,
}

impl StaticReleaseProvider {
    pub fn new(releases: Vec<ReleaseRecord>) -> Self {
        Self { releases }
    }

    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub async fn from_file(path: &Path) -> Result<Self, ProviderError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub fn releases(&self) -> &[ReleaseRecord] {
        &self.releases
    }
}

#[async_trait]
impl ReleaseProvider for StaticReleaseProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, _cache_key: &str) -> Result<Vec<ReleaseRecord>, ProviderError> {
        Ok(self.releases.clone())
    }
}
