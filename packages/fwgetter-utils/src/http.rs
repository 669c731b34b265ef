use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Method, StatusCode, Uri};
#[cfg(not(feature = "rustls-platform-verifier"))]
use hyper_rustls::ConfigBuilderExt;
use hyper_util::{
    client::legacy::{
        connect::{Connect, HttpConnector},
        Client,
    },
    rt::TokioExecutor,
};
use once_cell::sync::Lazy;
use rustls::ClientConfig;
#[cfg(feature = "rustls-platform-verifier")]
use rustls_platform_verifier::BuilderVerifierExt;
use std::{collections::HashMap, fmt, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] hyper::http::Error),

    #[error("tls setup failed: {0}")]
    Tls(String),

    #[error("request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug)]
pub struct ResponseData {
    pub status: u16,
    pub body: Bytes,
}

impl ResponseData {
    pub fn is_ok(&self) -> bool {
        http_status_is_ok(self.status)
    }
}

impl fmt::Display for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response status: {}, body: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        )
    }
}

/// Issue a GET request, choosing the TLS connector for `https` urls.
///
/// A `timeout` bounds the whole exchange including reading the body.
pub async fn get(
    url: Uri,
    header_map: &HashMap<String, String>,
    timeout: Option<Duration>,
) -> Result<ResponseData, HttpError> {
    tracing::debug!(%url, "GET");
    match timeout {
        Some(limit) => tokio::time::timeout(limit, dispatch_get(url, header_map))
            .await
            .map_err(|_| HttpError::Timeout(limit))?,
        None => dispatch_get(url, header_map).await,
    }
}

async fn dispatch_get(
    url: Uri,
    header_map: &HashMap<String, String>,
) -> Result<ResponseData, HttpError> {
    if url.scheme_str() == Some("https") {
        send_get(https_config()?, url, header_map).await
    } else {
        send_get(HttpConnector::new(), url, header_map).await
    }
}

async fn send_get<C>(
    connector: C,
    url: Uri,
    header_map: &HashMap<String, String>,
) -> Result<ResponseData, HttpError>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    let client: Client<C, Empty<Bytes>> = Client::builder(TokioExecutor::new()).build(connector);

    let mut req = hyper::Request::builder().method(Method::GET).uri(url);
    for (key, value) in header_map {
        req = req.header(key.as_str(), value.as_str());
    }
    let req = req.body(Empty::<Bytes>::new())?;

    let res = client.request(req).await?;
    let status = res.status().as_u16();
    let body = res.into_body().collect().await?.to_bytes();
    Ok(ResponseData { status, body })
}

static PROVIDER: Lazy<std::sync::Arc<rustls::crypto::CryptoProvider>> =
    Lazy::new(|| std::sync::Arc::new(rustls::crypto::ring::default_provider()));

fn https_config() -> Result<hyper_rustls::HttpsConnector<HttpConnector>, HttpError> {
    let provider = PROVIDER.clone();
    let tls: ClientConfig;
    #[cfg(feature = "rustls-platform-verifier")]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_platform_verifier()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_no_client_auth();
    }
    #[cfg(all(feature = "webpki-roots", not(feature = "rustls-platform-verifier")))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_webpki_roots()
            .with_no_client_auth();
    }
    #[cfg(all(
        feature = "native-tokio",
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_native_roots()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_no_client_auth();
    }
    #[cfg(all(
        not(feature = "native-tokio"),
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        compile_error!("No TLS backend enabled");
    }
    Ok(hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build())
}

pub fn http_status_is_ok(status: u16) -> bool {
    if let Ok(status) = StatusCode::from_u16(status) {
        status.is_success()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_http_status_is_ok() {
        assert!(http_status_is_ok(200));
        assert!(http_status_is_ok(204));
        assert!(!http_status_is_ok(304));
        assert!(!http_status_is_ok(404));
        assert!(!http_status_is_ok(503));
        assert!(!http_status_is_ok(1000));
    }

    #[tokio::test]
    async fn test_get_sends_headers_and_reads_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/releases")
            .match_header("x-test", "yes")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let url = format!("{}/releases", server.url()).parse().unwrap();
        let headers = HashMap::from([("X-Test".to_string(), "yes".to_string())]);
        let rsp = get(url, &headers, None).await.unwrap();
        assert!(rsp.is_ok());
        assert_eq!(&rsp.body[..], b"[]");
    }

    #[tokio::test]
    async fn test_get_keeps_error_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing", server.url()).parse().unwrap();
        let rsp = get(url, &HashMap::new(), Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(rsp.status, 404);
        assert!(!rsp.is_ok());
    }

    #[tokio::test]
    async fn test_get_connection_refused() {
        // Port 9 (discard) is not expected to accept connections locally
        let url = "http://127.0.0.1:9/".parse().unwrap();
        let result = get(url, &HashMap::new(), Some(Duration::from_secs(5))).await;
        assert!(result.is_err());
    }
}
