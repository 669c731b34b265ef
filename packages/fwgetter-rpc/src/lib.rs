pub mod server;
pub mod types;

pub use server::FirmwareRpcServer;
pub use types::*;
