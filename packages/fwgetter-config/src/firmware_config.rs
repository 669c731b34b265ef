//! Configuration for the firmware update service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareConfig {
    /// Owner of the GitHub repository that publishes firmware releases
    #[serde(default = "default_github_owner")]
    pub github_owner: String,

    /// Repository that publishes firmware releases
    #[serde(default = "default_github_repo")]
    pub github_repo: String,

    /// Bearer token for the GitHub API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Base url of the GitHub REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Number of releases requested per listing call
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Key under which the release listing is cached
    #[serde(default = "default_cache_key")]
    pub cache_key: String,

    /// Lifetime of a cached release listing in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Timeout for the upstream listing call in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_github_owner() -> String {
    "BasedHardware".to_string()
}

fn default_github_repo() -> String {
    "omi".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_cache_key() -> String {
    "github_releases_omi".to_string()
}

fn default_cache_ttl() -> u64 {
    1800 // 30 minutes
}

fn default_http_timeout() -> u64 {
    30
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            github_owner: default_github_owner(),
            github_repo: default_github_repo(),
            github_token: None,
            api_url: default_api_url(),
            per_page: default_per_page(),
            cache_key: default_cache_key(),
            cache_ttl_secs: default_cache_ttl(),
            http_timeout_secs: default_http_timeout(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl FirmwareConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.github_owner = owner.into();
        self.github_repo = repo.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    pub fn with_cache_ttl(mut self, seconds: u64) -> Self {
        self.cache_ttl_secs = seconds;
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_secs = seconds;
        self
    }

    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Token, if one is set and not blank
    pub fn token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Url of the release listing endpoint
    pub fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page={}",
            self.api_url.trim_end_matches('/'),
            self.github_owner,
            self.github_repo,
            self.per_page
        )
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - GITHUB_TOKEN: bearer token for the GitHub API
    /// - FIRMWARE_GITHUB_OWNER: repository owner (default: BasedHardware)
    /// - FIRMWARE_GITHUB_REPO: repository name (default: omi)
    /// - FIRMWARE_GITHUB_API_URL: API base url (default: https://api.github.com)
    /// - FIRMWARE_PER_PAGE: releases per listing call (default: 100)
    /// - FIRMWARE_CACHE_KEY: cache key (default: github_releases_omi)
    /// - FIRMWARE_CACHE_TTL: seconds (default: 1800)
    /// - FIRMWARE_HTTP_TIMEOUT: seconds (default: 30)
    /// - FIRMWARE_LISTEN_ADDR: bind address (default: 127.0.0.1:8080)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(token) = lookup("GITHUB_TOKEN") {
            config.github_token = Some(token);
        }
        if let Some(owner) = lookup("FIRMWARE_GITHUB_OWNER") {
            config.github_owner = owner;
        }
        if let Some(repo) = lookup("FIRMWARE_GITHUB_REPO") {
            config.github_repo = repo;
        }
        if let Some(api_url) = lookup("FIRMWARE_GITHUB_API_URL") {
            config.api_url = api_url;
        }
        if let Some(per_page) = lookup("FIRMWARE_PER_PAGE") {
            match per_page.parse() {
                Ok(per_page) => config.per_page = per_page,
                Err(_) => tracing::warn!("Invalid FIRMWARE_PER_PAGE: {}, using default", per_page),
            }
        }
        if let Some(cache_key) = lookup("FIRMWARE_CACHE_KEY") {
            config.cache_key = cache_key;
        }
        if let Some(ttl) = lookup("FIRMWARE_CACHE_TTL") {
            match ttl.parse() {
                Ok(ttl) => config.cache_ttl_secs = ttl,
                Err(_) => tracing::warn!("Invalid FIRMWARE_CACHE_TTL: {}, using default", ttl),
            }
        }
        if let Some(timeout) = lookup("FIRMWARE_HTTP_TIMEOUT") {
            match timeout.parse() {
                Ok(timeout) => config.http_timeout_secs = timeout,
                Err(_) => {
                    tracing::warn!("Invalid FIRMWARE_HTTP_TIMEOUT: {}, using default", timeout)
                }
            }
        }
        if let Some(addr) = lookup("FIRMWARE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        config
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize configuration to JSON string
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
