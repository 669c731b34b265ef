use fwgetter_config::FirmwareConfig;
use fwgetter_provider::{GitHubReleaseProvider, ReleaseProvider, ReleaseRecord};
use fwgetter_utils::VersionCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::assembler::{assemble, UpdateAnswer};
use crate::device::DeviceModel;
use crate::error::{FirmwareError, Result};
use crate::selector::CandidateSelector;

/// What a device reports when it asks for an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareQuery {
    pub device_model: String,
    pub firmware_revision: String,
    pub hardware_revision: String,
    pub manufacturer_name: String,
}

impl FirmwareQuery {
    pub fn new(device_model: impl Into<String>, firmware_revision: impl Into<String>) -> Self {
        Self {
            device_model: device_model.into(),
            firmware_revision: firmware_revision.into(),
            ..Default::default()
        }
    }

    pub fn with_hardware_revision(mut self, hardware_revision: impl Into<String>) -> Self {
        self.hardware_revision = hardware_revision.into();
        self
    }

    pub fn with_manufacturer_name(mut self, manufacturer_name: impl Into<String>) -> Self {
        self.manufacturer_name = manufacturer_name.into();
        self
    }
}

/// Answers "which firmware should this device install next".
pub struct FirmwareService {
    provider: Arc<dyn ReleaseProvider>,
    cache_key: String,
}

impl FirmwareService {
    pub fn new(provider: Arc<dyn ReleaseProvider>, cache_key: impl Into<String>) -> Self {
        Self {
            provider,
            cache_key: cache_key.into(),
        }
    }

    /// Service backed by the GitHub releases of the configured repository.
    pub fn from_config(config: &FirmwareConfig) -> Self {
        let cache_key = config.cache_key.clone();
        Self::new(Arc::new(GitHubReleaseProvider::new(config.clone())), cache_key)
    }

    pub fn provider(&self) -> &dyn ReleaseProvider {
        self.provider.as_ref()
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    async fn resolve(&self, query: &FirmwareQuery) -> Result<(DeviceModel, Vec<ReleaseRecord>)> {
        debug!(
            device_model = %query.device_model,
            firmware_revision = %query.firmware_revision,
            hardware_revision = %query.hardware_revision,
            manufacturer_name = %query.manufacturer_name,
            "firmware lookup"
        );
        let device = DeviceModel::from_model_name(&query.device_model).ok_or_else(|| {
            FirmwareError::DeviceNotFound {
                model_name: query.device_model.clone(),
            }
        })?;
        let releases = self.provider.fetch(&self.cache_key).await?;
        debug!(
            provider = self.provider.name(),
            count = releases.len(),
            "release listing loaded"
        );
        Ok((device, releases))
    }

    /// Latest eligible update for the querying device.
    pub async fn latest_firmware(&self, query: &FirmwareQuery) -> Result<UpdateAnswer> {
        let (device, releases) = self.resolve(query).await?;
        let current = VersionCode::from_str_lossy(&query.firmware_revision);

        let candidate = CandidateSelector::for_device(device)
            .select(&releases, &current)
            .ok_or(FirmwareError::NoSuitableUpdate)?;
        let answer = assemble(candidate.release, &candidate.metadata)?;
        info!(
            device = %device,
            current = %current,
            offered = %candidate.version,
            "firmware update offered"
        );
        Ok(answer)
    }

    /// Tags of every eligible release, most recently published first.
    pub async fn candidate_tags(&self, query: &FirmwareQuery) -> Result<Vec<String>> {
        let (device, releases) = self.resolve(query).await?;
        let current = VersionCode::from_str_lossy(&query.firmware_revision);
        Ok(CandidateSelector::for_device(device)
            .candidates(&releases, &current)
            .iter()
            .filter_map(|candidate| candidate.release.tag_name.clone())
            .collect())
    }
}
