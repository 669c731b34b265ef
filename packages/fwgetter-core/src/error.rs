//! Error types for the firmware update service

use fwgetter_provider::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FirmwareError {
    #[error("Device not found")]
    DeviceNotFound { model_name: String },

    #[error("Failed to fetch firmware releases: {0}")]
    UpstreamUnavailable(#[from] ProviderError),

    #[error("No suitable firmware update found for your device version.")]
    NoSuitableUpdate,

    #[error("Malformed release {tag}: {reason}")]
    MalformedAsset { tag: String, reason: AssetProblem },
}

/// What is wrong with the assets of the chosen release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssetProblem {
    #[error("no OTA zip found")]
    NoOtaAsset,

    #[error("download URL missing")]
    MissingDownloadUrl,
}

/// How an error is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Unavailable,
    Internal,
}

impl FirmwareError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FirmwareError::DeviceNotFound { .. } | FirmwareError::NoSuitableUpdate => {
                ErrorClass::NotFound
            }
            FirmwareError::UpstreamUnavailable(_) => ErrorClass::Unavailable,
            FirmwareError::MalformedAsset { .. } => ErrorClass::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, FirmwareError>;
