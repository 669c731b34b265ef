use serde::{Deserialize, Serialize};

/// Downloadable file attached to a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(rename = "name", default)]
    pub file_name: Option<String>,
    #[serde(rename = "browser_download_url", default)]
    pub download_url: Option<String>,
}

impl AssetRecord {
    pub fn new(file_name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            download_url: Some(download_url.into()),
        }
    }
}

/// One upstream release, shaped after the GitHub releases API.
///
/// Fields the service does not read are dropped while decoding. `published_at`
/// is kept as the raw ISO-8601 string; those sort correctly as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}

impl ReleaseRecord {
    pub fn new(tag_name: impl Into<String>, published_at: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            published_at: Some(published_at.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_asset(mut self, asset: AssetRecord) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }
}
