//! HTTP client creation and the hyper-backed dispatcher.
//!
//! `HttpDispatcher` plays the part of the native dispatcher in real use. It
//! resolves relative targets against the configured origin itself, the way a
//! browser's fetch resolves against the page.

use super::target::{resolve_url, RequestOptions, RequestTarget};
use super::{Dispatch, DispatchError, MonitorResponse};
use crate::config::{ConnectionPoolConfig, MonitorConfig};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Method, Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Type alias for the pooled HTTP client used for dispatch.
pub type HttpClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Create a shared HTTP client with connection pooling.
pub fn create_http_client(pool: &ConnectionPoolConfig) -> std::io::Result<HttpClient> {
    let mut http_connector = HttpConnector::new();
    http_connector.set_keepalive(Some(Duration::from_secs(pool.keepalive_timeout_secs)));
    http_connector.set_connect_timeout(Some(Duration::from_secs(pool.connect_timeout_secs)));
    http_connector.enforce_http(false); // Allow both HTTP and HTTPS

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .wrap_connector(http_connector);

    let http_client = Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(pool.idle_timeout_secs))
        .pool_max_idle_per_host(pool.max_idle_per_host)
        .build(https_connector);

    info!(
        "Connection pool configured (HTTP/1.1): max_idle={}, idle_timeout={}s, keepalive={}s",
        pool.max_idle_per_host, pool.idle_timeout_secs, pool.keepalive_timeout_secs
    );

    Ok(http_client)
}

/// Dispatcher that performs real HTTP(S) calls and buffers the response body.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: HttpClient,
    origin: Option<Url>,
}

impl HttpDispatcher {
    pub fn new(config: &MonitorConfig) -> anyhow::Result<Self> {
        let client = create_http_client(&config.connection_pool)?;
        Ok(Self {
            client,
            origin: config.origin_url()?,
        })
    }
}

/// Build the outgoing request from the caller's arguments.
///
/// Options override the descriptor: method is replaced, headers are
/// inserted over existing ones and a body replaces the descriptor body.
fn build_request(
    target: RequestTarget,
    options: Option<RequestOptions>,
    origin: Option<&Url>,
) -> Result<Request<Full<Bytes>>, DispatchError> {
    let options = options.unwrap_or_default();

    let (mut parts, mut body) = match target {
        RequestTarget::Url(raw) => {
            let mut request = Request::new(Full::new(Bytes::new()));
            *request.uri_mut() = absolute_uri(&raw, origin)?;
            request.into_parts()
        }
        RequestTarget::Descriptor(request) => {
            let (mut parts, body) = request.into_parts();
            if parts.uri.scheme().is_none() {
                parts.uri = absolute_uri(&parts.uri.to_string(), origin)?;
            }
            (parts, body)
        }
    };

    if let Some(method) = options.method.as_deref().filter(|m| !m.is_empty()) {
        parts.method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|e| DispatchError::InvalidRequest(format!("method {method:?}: {e}")))?;
    }

    for (name, value) in &options.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| DispatchError::InvalidRequest(format!("header {name:?}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| DispatchError::InvalidRequest(format!("header {name:?}: {e}")))?;
        parts.headers.insert(header_name, header_value);
    }

    if let Some(bytes) = options.body {
        body = Full::new(bytes);
    }

    Ok(Request::from_parts(parts, body))
}

/// Resolve `raw` and make sure the result can actually be sent.
fn absolute_uri(raw: &str, origin: Option<&Url>) -> Result<Uri, DispatchError> {
    let resolved = resolve_url(raw, origin);
    let uri: Uri = resolved
        .parse()
        .map_err(|e| DispatchError::InvalidRequest(format!("url {resolved:?}: {e}")))?;
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(DispatchError::InvalidRequest(format!(
            "cannot send relative url {raw:?} without an origin"
        )));
    }
    Ok(uri)
}

#[async_trait]
impl Dispatch for HttpDispatcher {
    async fn dispatch(
        &self,
        target: RequestTarget,
        options: Option<RequestOptions>,
    ) -> Result<MonitorResponse, DispatchError> {
        let request = build_request(target, options, self.origin.as_ref())?;
        debug!("Dispatching {} {}", request.method(), request.uri());

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let body_bytes = body
            .collect()
            .await
            .map_err(|e| DispatchError::Network(format!("failed to read response body: {e}")))?
            .to_bytes();

        Ok(Response::from_parts(parts, Full::new(body_bytes)))
    }
}
