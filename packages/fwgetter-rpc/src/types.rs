use fwgetter_core::{ErrorClass, FirmwareError};
use serde::{Deserialize, Serialize};

pub const INVALID_PARAMS: i32 = -32602;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const NOT_FOUND: i32 = -32004;
pub const UPSTREAM_UNAVAILABLE: i32 = -32003;
pub const INTERNAL_ERROR: i32 = -32000;

pub const GET_LATEST_FIRMWARE: &str = "get_latest_firmware";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<serde_json::Value>,
    pub id: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: serde_json::Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(RpcError { code, message }),
            id,
        }
    }
}

/// Error body of the REST route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// JSON-RPC error code for a lookup failure.
pub fn error_code(err: &FirmwareError) -> i32 {
    match err.class() {
        ErrorClass::NotFound => NOT_FOUND,
        ErrorClass::Unavailable => UPSTREAM_UNAVAILABLE,
        ErrorClass::Internal => INTERNAL_ERROR,
    }
}
