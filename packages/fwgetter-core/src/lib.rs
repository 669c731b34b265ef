// Core module that ties everything together

pub mod assembler;
pub mod device;
pub mod error;
pub mod metadata;
pub mod selector;
pub mod service;

pub use assembler::{assemble, parse_bool_or, UpdateAnswer};
pub use device::DeviceModel;
pub use error::{AssetProblem, ErrorClass, FirmwareError, Result};
pub use metadata::{MetadataValue, ReleaseMetadata};
pub use selector::{Candidate, CandidateSelector, Rejection};
pub use service::{FirmwareQuery, FirmwareService};

pub use fwgetter_config::FirmwareConfig;
pub use fwgetter_provider::{ReleaseProvider, ReleaseRecord};
pub use fwgetter_utils::VersionCode;
