use fwgetter_provider::{AssetRecord, ReleaseRecord};
use serde::{Deserialize, Serialize};

use crate::error::{AssetProblem, FirmwareError, Result};
use crate::metadata::{
    ReleaseMetadata, CHANGELOG, IS_LEGACY_SECURE_DFU, MINIMUM_APP_VERSION,
    MINIMUM_APP_VERSION_CODE, MINIMUM_FIRMWARE_REQUIRED, OTA_UPDATE_STEPS,
    RELEASE_FIRMWARE_VERSION,
};

/// Update offered to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAnswer {
    pub version: Option<String>,
    pub min_version: Option<String>,
    pub min_app_version: Option<String>,
    pub min_app_version_code: Option<String>,
    pub zip_url: String,
    pub draft: bool,
    pub ota_update_steps: Vec<String>,
    pub is_legacy_secure_dfu: bool,
    pub changelog: Vec<String>,
}

/// Parse `True`/`False` in any letter case, falling back to `default`.
pub fn parse_bool_or(value: &str, default: bool) -> bool {
    match capitalize(value).as_str() {
        "True" => true,
        "False" => false,
        _ => default,
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// First asset whose name contains `ota` (any case) and ends in `.zip`.
pub fn find_ota_asset(assets: &[AssetRecord]) -> Option<&AssetRecord> {
    assets.iter().find(|asset| {
        asset
            .file_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains("ota") && name.ends_with(".zip"))
    })
}

/// Build the answer for a selected release.
pub fn assemble(release: &ReleaseRecord, metadata: &ReleaseMetadata) -> Result<UpdateAnswer> {
    let malformed = |reason| FirmwareError::MalformedAsset {
        tag: release.tag_name.clone().unwrap_or_default(),
        reason,
    };

    let asset = find_ota_asset(&release.assets).ok_or_else(|| malformed(AssetProblem::NoOtaAsset))?;
    let zip_url = asset
        .download_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| malformed(AssetProblem::MissingDownloadUrl))?;

    let is_legacy_secure_dfu = parse_bool_or(
        metadata.text(IS_LEGACY_SECURE_DFU).unwrap_or("True"),
        true,
    );
    let text = |key| metadata.text(key).map(str::to_string);
    let list = |key| metadata.list(key).map(<[String]>::to_vec).unwrap_or_default();

    Ok(UpdateAnswer {
        version: text(RELEASE_FIRMWARE_VERSION),
        min_version: text(MINIMUM_FIRMWARE_REQUIRED),
        min_app_version: text(MINIMUM_APP_VERSION),
        min_app_version_code: text(MINIMUM_APP_VERSION_CODE),
        zip_url: zip_url.to_string(),
        draft: false,
        ota_update_steps: list(OTA_UPDATE_STEPS),
        is_legacy_secure_dfu,
        changelog: list(CHANGELOG),
    })
}
