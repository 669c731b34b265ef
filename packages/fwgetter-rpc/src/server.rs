use crate::types::*;
use fwgetter_core::{ErrorClass, FirmwareError, FirmwareQuery, FirmwareService};
use hyper::{body::Bytes, service::Service, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

type Body = http_body_util::Full<Bytes>;
type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const LATEST_FIRMWARE_PATH: &str = "/v2/firmware/latest";
pub const RPC_PATH: &str = "/";

const QUERY_FIELDS: [&str; 4] = [
    "device_model",
    "firmware_revision",
    "hardware_revision",
    "manufacturer_name",
];

pub struct FirmwareRpcServer {
    service: Arc<FirmwareService>,
}

impl FirmwareRpcServer {
    pub fn new(service: Arc<FirmwareService>) -> Self {
        Self { service }
    }

    pub async fn start(self, addr: SocketAddr) -> Result<(), BoxError> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> Result<(), BoxError>
    where
        F: Future<Output = ()>,
    {
        info!("Firmware server listening on {}", listener.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Firmware server shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => accepted?,
            };
            let io = TokioIo::new(stream);
            let service = FirmwareHttpService {
                service: self.service.clone(),
            };

            tokio::spawn(async move {
                if let Err(err) = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    warn!(%peer, "Error serving connection: {:?}", err);
                }
            });
        }
    }
}

#[derive(Clone)]
struct FirmwareHttpService {
    service: Arc<FirmwareService>,
}

impl Service<Request<hyper::body::Incoming>> for FirmwareHttpService {
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<hyper::body::Incoming>) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            debug!(method = %req.method(), uri = %req.uri(), "request");
            let path = req.uri().path().to_string();
            match path.as_str() {
                LATEST_FIRMWARE_PATH => {
                    if req.method() != Method::GET {
                        return method_not_allowed();
                    }
                    handle_latest_firmware(&service, req.uri().query()).await
                }
                RPC_PATH => {
                    if req.method() != Method::POST {
                        return method_not_allowed();
                    }
                    handle_rpc_call(&service, req).await
                }
                _ => json_response(StatusCode::NOT_FOUND, &ErrorBody::new("Not Found")),
            }
        })
    }
}

async fn handle_latest_firmware(
    service: &FirmwareService,
    query: Option<&str>,
) -> Result<Response<Body>, BoxError> {
    let mut params = parse_query(query.unwrap_or_default());
    if let Some(missing) = QUERY_FIELDS.iter().find(|name| !params.contains_key(**name)) {
        return json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &ErrorBody::new(format!("Missing query parameter: {}", missing)),
        );
    }
    let mut take = |name: &str| params.remove(name).unwrap_or_default();
    let query = FirmwareQuery {
        device_model: take("device_model"),
        firmware_revision: take("firmware_revision"),
        hardware_revision: take("hardware_revision"),
        manufacturer_name: take("manufacturer_name"),
    };

    match service.latest_firmware(&query).await {
        Ok(answer) => json_response(StatusCode::OK, &answer),
        Err(err) => {
            log_failure(&err);
            json_response(status_for(&err), &ErrorBody::new(err.to_string()))
        }
    }
}

async fn handle_rpc_call(
    service: &FirmwareService,
    req: Request<hyper::body::Incoming>,
) -> Result<Response<Body>, BoxError> {
    let body_bytes = match http_body_util::BodyExt::collect(req.into_body()).await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Body::from(format!("Failed to read body: {}", e)))?);
        }
    };

    let rpc_request: RpcRequest = match serde_json::from_slice(&body_bytes) {
        Ok(req) => req,
        Err(e) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Body::from(format!("Invalid JSON-RPC request: {}", e)))?);
        }
    };

    let response = handle_rpc_request(service, rpc_request).await;
    json_response(StatusCode::OK, &response)
}

async fn handle_rpc_request(service: &FirmwareService, request: RpcRequest) -> RpcResponse {
    match request.method.as_str() {
        GET_LATEST_FIRMWARE => {
            let Some(params) = request.params else {
                return RpcResponse::error(request.id, INVALID_PARAMS, "Missing parameters".to_string());
            };
            let Ok(query) = serde_json::from_value::<FirmwareQuery>(params) else {
                return RpcResponse::error(request.id, INVALID_PARAMS, "Invalid parameters".to_string());
            };
            match service.latest_firmware(&query).await {
                Ok(answer) => match serde_json::to_value(answer) {
                    Ok(result) => RpcResponse::success(request.id, result),
                    Err(e) => RpcResponse::error(request.id, INTERNAL_ERROR, e.to_string()),
                },
                Err(err) => {
                    log_failure(&err);
                    RpcResponse::error(request.id, error_code(&err), err.to_string())
                }
            }
        }
        _ => RpcResponse::error(request.id, METHOD_NOT_FOUND, "Method not found".to_string()),
    }
}

fn status_for(err: &FirmwareError) -> StatusCode {
    match err.class() {
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_failure(err: &FirmwareError) {
    match err.class() {
        ErrorClass::NotFound => debug!("{}", err),
        ErrorClass::Unavailable | ErrorClass::Internal => warn!("{}", err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, BoxError> {
    let json = serde_json::to_string(body)?;
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(json))?)
}

fn method_not_allowed() -> Result<Response<Body>, BoxError> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorBody::new("Method Not Allowed"),
    )
}

/// Decode a URL query string. A repeated key keeps its last value.
fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}
