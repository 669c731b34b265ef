//! Key/value block embedded in release notes
//!
//! Release bodies carry their machine-readable fields inside an HTML comment:
//!
//! ```text
//! <!-- KEY_VALUE_START
//! release_firmware_version:v2.0.5
//! minimum_firmware_required:v2.0.0
//! ota_update_steps:step1,step2
//! changelog:fixed bug A|added feature B
//! KEY_VALUE_END -->
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const RELEASE_FIRMWARE_VERSION: &str = "release_firmware_version";
pub const MINIMUM_FIRMWARE_REQUIRED: &str = "minimum_firmware_required";
pub const MINIMUM_APP_VERSION: &str = "minimum_app_version";
pub const MINIMUM_APP_VERSION_CODE: &str = "minimum_app_version_code";
pub const OTA_UPDATE_STEPS: &str = "ota_update_steps";
pub const CHANGELOG: &str = "changelog";
pub const IS_LEGACY_SECURE_DFU: &str = "is_legacy_secure_dfu";

static KEY_VALUE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!-- KEY_VALUE_START\s*(.*?)\s*KEY_VALUE_END -->").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseMetadata {
    values: HashMap<String, MetadataValue>,
}

impl ReleaseMetadata {
    /// Extract the key/value block from a release body.
    ///
    /// A missing body or block yields empty metadata. Lines without `:` are
    /// skipped and a repeated key keeps its last value.
    pub fn extract(body: Option<&str>) -> Self {
        let mut values = HashMap::new();
        let block = body
            .and_then(|body| KEY_VALUE_BLOCK_REGEX.captures(body))
            .and_then(|captures| captures.get(1))
            .map(|block| block.as_str());
        let Some(block) = block else {
            return Self { values };
        };

        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let value = match key {
                OTA_UPDATE_STEPS => MetadataValue::List(split_entries(value, ',')),
                CHANGELOG => MetadataValue::List(split_entries(value, '|')),
                _ => MetadataValue::Text(value.to_string()),
            };
            values.insert(key.to_string(), value);
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(MetadataValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Like [`text`](Self::text) but treats an empty value as absent.
    pub fn non_empty_text(&self, key: &str) -> Option<&str> {
        self.text(key).filter(|value| !value.is_empty())
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key) {
            Some(MetadataValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn split_entries(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
