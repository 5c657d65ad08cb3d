//! The interceptor: wraps a dispatcher and records API/GraphQL calls.

use crate::capture::{
    capture_timestamp, decode_body, flatten_headers, new_capture_id, CaptureLog, CapturedCall,
    ExportError,
};
use crate::dispatch::{
    normalize, Dispatch, DispatchError, MonitorResponse, RequestOptions, RequestTarget,
};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// URL substrings that make a call observed.
pub const OBSERVED_PATTERNS: [&str; 2] = ["/api/", "/graphql"];

/// Whether a call to `url` is recorded.
pub fn is_observed(url: &str) -> bool {
    OBSERVED_PATTERNS.iter().any(|pattern| url.contains(pattern))
}

/// Dispatcher wrapper that records matching calls into a [`CaptureLog`].
///
/// The wrapper is invisible to callers: they get back exactly what the inner
/// dispatcher produced, success or error.
pub struct ApiMonitor {
    inner: Arc<dyn Dispatch>,
    origin: Option<Url>,
    log: CaptureLog,
}

impl ApiMonitor {
    pub fn new(inner: Arc<dyn Dispatch>) -> Self {
        Self {
            inner,
            origin: None,
            log: CaptureLog::new(),
        }
    }

    /// Origin that relative targets are resolved against before matching.
    pub fn with_origin(mut self, origin: impl Into<Option<Url>>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Perform a call through the inner dispatcher, recording it if observed.
    ///
    /// Descriptor targets and unmatched URLs are forwarded untouched. For
    /// observed calls exactly one [`CapturedCall`] is appended once the
    /// response arrives; a dispatch error is returned as-is and records nothing.
    pub async fn intercept(
        &self,
        target: RequestTarget,
        options: Option<RequestOptions>,
    ) -> Result<MonitorResponse, DispatchError> {
        let normalized = normalize(&target, options.as_ref(), self.origin.as_ref());
        let Some(url) = normalized.url.filter(|url| is_observed(url)) else {
            return self.inner.dispatch(target, options).await;
        };

        let id = new_capture_id();
        let response = self.inner.dispatch(target, options).await?;
        let body = decode_body(&response).await;

        let call = CapturedCall {
            id,
            url,
            method: normalized.method,
            timestamp: capture_timestamp(),
            status: response.status().as_u16(),
            headers: flatten_headers(response.headers()),
            body,
        };
        debug!(
            "Captured {} {} (status: {}, structured: {})",
            call.method,
            call.url,
            call.status,
            call.body.is_structured()
        );
        self.log.record(call);

        Ok(response)
    }

    /// Empty the log. Calls still in flight append afterwards.
    pub fn clear(&self) {
        self.log.clear();
    }

    /// Pretty-printed JSON export of the whole log.
    pub fn get_json(&self) -> String {
        self.log.to_json()
    }

    pub fn get_by_url(&self, pattern: &str) -> Vec<CapturedCall> {
        self.log.get_by_url(pattern)
    }

    pub fn get_by_url_matching(&self, pattern: &Regex) -> Vec<CapturedCall> {
        self.log.get_by_url_matching(pattern)
    }

    /// Raw ordered sequence of captured calls.
    pub fn responses(&self) -> Vec<CapturedCall> {
        self.log.all()
    }

    /// Underlying log, for callers that want `len`/`is_empty` without a snapshot.
    pub fn log(&self) -> &CaptureLog {
        &self.log
    }

    /// Write the unfiltered JSON export to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<usize, ExportError> {
        self.log.save_to_file(path)
    }
}

#[async_trait]
impl Dispatch for ApiMonitor {
    async fn dispatch(
        &self,
        target: RequestTarget,
        options: Option<RequestOptions>,
    ) -> Result<MonitorResponse, DispatchError> {
        self.intercept(target, options).await
    }
}
