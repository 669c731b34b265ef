pub mod http;
pub mod versioning;

// Re-export main utilities
pub use http::{get, http_status_is_ok, HttpError, ResponseData};
pub use versioning::VersionCode;
