pub mod firmware_config;

// Re-export commonly used types
pub use firmware_config::{ConfigError, FirmwareConfig};
