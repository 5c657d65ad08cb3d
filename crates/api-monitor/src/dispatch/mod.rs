//! Dispatch layer.
//!
//! A [`Dispatch`] is the capability that actually performs an HTTP call, the
//! equivalent of a page's native `fetch`. The monitor wraps one and exposes the
//! same trait, so it can be installed anywhere the wrapped dispatcher was used.
//!
//! # Module Structure
//!
//! - `target` - Request target/options types and URL normalization
//! - `client` - Pooled hyper-based dispatcher for real traffic

mod client;
mod target;

pub use client::{create_http_client, HttpClient, HttpDispatcher};
pub use target::{normalize, resolve_url, Normalized, RequestOptions, RequestTarget};

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use thiserror::Error;

/// Fully buffered response handed back by every dispatcher.
pub type MonitorResponse = Response<Full<Bytes>>;

/// Failure reported by a dispatcher.
///
/// The monitor never produces these itself; it only passes them through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request aborted")]
    Aborted,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Something that can perform an HTTP call.
///
/// `target` and `options` mirror `fetch(target, options)`.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(
        &self,
        target: RequestTarget,
        options: Option<RequestOptions>,
    ) -> Result<MonitorResponse, DispatchError>;
}

/// Copy status, version, headers and body into a fresh response.
///
/// Extensions are not carried over; the copy only exists to be read.
pub fn duplicate_response(response: &MonitorResponse) -> MonitorResponse {
    let mut copy = Response::new(response.body().clone());
    *copy.status_mut() = response.status();
    *copy.version_mut() = response.version();
    *copy.headers_mut() = response.headers().clone();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_duplicate_keeps_original_readable() {
        let original = Response::builder()
            .status(201)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(b"{\"ok\":true}")))
            .unwrap();

        let copy = duplicate_response(&original);
        let copy_bytes = copy.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&copy_bytes[..], b"{\"ok\":true}");

        assert_eq!(original.status(), 201);
        assert_eq!(
            original.headers().get("content-type").unwrap(),
            "application/json"
        );
        let original_bytes = original.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(original_bytes, copy_bytes);
    }

    #[test]
    fn test_dispatch_error_display() {
        assert_eq!(DispatchError::Aborted.to_string(), "request aborted");
        assert_eq!(
            DispatchError::Network("connection refused".into()).to_string(),
            "network error: connection refused"
        );
    }
}
