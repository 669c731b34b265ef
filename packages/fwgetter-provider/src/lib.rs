pub mod base_provider;
pub mod data;
pub mod providers;

// Re-export common types
pub use base_provider::{ProviderError, ReleaseProvider};
pub use data::{AssetRecord, ReleaseRecord};
pub use providers::{GitHubReleaseProvider, StaticReleaseProvider};
