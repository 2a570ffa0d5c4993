use bytes::{Bytes, BytesMut};
use http_body_util::{BodyExt, Empty};
use hyper::{StatusCode, Uri};
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
use tracing::debug;

pub type HttpResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug)]
pub struct ResponseData {
    pub status: u16,
    /// Response headers, keyed by lower-case name.
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
}

impl ResponseData {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }
}

impl fmt::Display for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response status: {}, body: {}",
            self.status,
            self.body.as_ref().map_or_else(
                || "".to_string(),
                |body| String::from_utf8_lossy(body).to_string(),
            )
        )
    }
}

#[derive(Debug)]
pub struct TimeoutError {
    pub url: String,
    pub timeout: Duration,
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request to {} timed out after {}s",
            self.url,
            self.timeout.as_secs_f32()
        )
    }
}

impl std::error::Error for TimeoutError {}

/// GET `url`, picking plain HTTP or rustls-backed HTTPS from the scheme.
///
/// With `timeout` set, the whole exchange (connect, headers and body) must
/// finish in time or a [`TimeoutError`] is returned.
pub async fn get(
    url: Uri,
    header_map: &HashMap<String, String>,
    timeout: Option<Duration>,
) -> HttpResult<ResponseData> {
    debug!(%url, "GET");
    let fut = async {
        if url.scheme_str() == Some("https") {
            https_get(url.clone(), header_map).await
        } else {
            http_get(url.clone(), header_map).await
        }
    };
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(TimeoutError {
                url: url.to_string(),
                timeout: limit,
            })),
        },
        None => fut.await,
    }
}

pub async fn http_get(url: Uri, header_map: &HashMap<String, String>) -> HttpResult<ResponseData> {
    let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    send(client, url, header_map).await
}

pub async fn https_get(url: Uri, header_map: &HashMap<String, String>) -> HttpResult<ResponseData> {
    let client = Client::builder(TokioExecutor::new()).build(https_config()?);
    send(client, url, header_map).await
}

async fn send<C>(
    client: Client<C, Empty<Bytes>>,
    url: Uri,
    header_map: &HashMap<String, String>,
) -> HttpResult<ResponseData>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    let mut req = hyper::Request::builder().method("GET").uri(url);
    for (key, value) in header_map {
        req = req.header(key, value);
    }
    let req = req.body(Empty::<Bytes>::new())?;

    let mut res = client.request(req).await?;
    let status = res.status();
    let headers = res
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let mut body = BytesMut::new();
    while let Some(next) = res.frame().await {
        let frame = next?;
        if let Some(chunk) = frame.data_ref() {
            body.extend_from_slice(chunk);
        }
    }
    Ok(ResponseData {
        status: status.as_u16(),
        headers,
        body: Some(body.freeze()),
    })
}

static PROVIDER: Lazy<std::sync::Arc<rustls::crypto::CryptoProvider>> =
    Lazy::new(|| std::sync::Arc::new(rustls::crypto::ring::default_provider()));

struct HttpsConfigError {
    error: Box<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for HttpsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpsConfigError: {}", self.error)
    }
}

impl fmt::Debug for HttpsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpsConfigError: {:?}", self.error)
    }
}

impl std::error::Error for HttpsConfigError {}

fn https_config() -> Result<hyper_rustls::HttpsConnector<HttpConnector>, HttpsConfigError> {
    let provider = PROVIDER.clone();
    let tls: rustls::ClientConfig;
    #[cfg(feature = "rustls-platform-verifier")]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_platform_verifier()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_no_client_auth();
    }
    #[cfg(all(feature = "webpki-roots", not(feature = "rustls-platform-verifier")))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
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
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_native_roots()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
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
        !(status.is_client_error() || status.is_server_error())
    } else {
        false
    }
}
