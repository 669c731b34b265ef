//! fwgetter - firmware update lookup for Omi devices
//!
//! Resolves the device model, reads the GitHub release listing through a
//! cached provider and picks the newest release the device may install.

pub use fwgetter_cache as cache;
pub use fwgetter_config as config;
pub use fwgetter_core as core;
pub use fwgetter_provider as provider;
pub use fwgetter_rpc as rpc;
pub use fwgetter_utils as utils;

// Re-export commonly used types for convenience
pub use fwgetter_cache::CacheManager;
pub use fwgetter_config::FirmwareConfig;
pub use fwgetter_core::{
    DeviceModel, FirmwareError, FirmwareQuery, FirmwareService, UpdateAnswer, VersionCode,
};
pub use fwgetter_provider::{GitHubReleaseProvider, ReleaseProvider, StaticReleaseProvider};
pub use fwgetter_rpc::FirmwareRpcServer;
