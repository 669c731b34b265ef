//! Release provider implementations

pub mod github;
pub mod static_list;

pub use github::GitHubReleaseProvider;
pub use static_list::StaticReleaseProvider;
