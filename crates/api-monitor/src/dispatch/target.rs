//! Request targets and their normalization into an effective URL and method.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Request;
use tracing::debug;
use url::Url;

/// What a call is aimed at: a URL string or a full request descriptor.
#[derive(Debug)]
pub enum RequestTarget {
    Url(String),
    Descriptor(Request<Full<Bytes>>),
}

impl From<&str> for RequestTarget {
    fn from(url: &str) -> Self {
        RequestTarget::Url(url.to_string())
    }
}

impl From<String> for RequestTarget {
    fn from(url: String) -> Self {
        RequestTarget::Url(url)
    }
}

impl From<Request<Full<Bytes>>> for RequestTarget {
    fn from(request: Request<Full<Bytes>>) -> Self {
        RequestTarget::Descriptor(request)
    }
}

/// Optional per-call configuration (method, headers, body).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl RequestOptions {
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Effective URL and method of a call, as used for matching and logging.
///
/// `url` is `None` for descriptor targets, which are never matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub url: Option<String>,
    pub method: String,
}

/// Resolve `raw` against `origin` unless it already carries a scheme.
///
/// Never fails: when there is no origin or the join is rejected, the raw
/// string is returned unchanged.
pub fn resolve_url(raw: &str, origin: Option<&Url>) -> String {
    match Url::parse(raw) {
        Ok(_) => return raw.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(e) => {
            debug!("Keeping unresolved target {:?}: {}", raw, e);
            return raw.to_string();
        }
    }

    let Some(origin) = origin else {
        debug!("No origin configured, keeping relative target {:?}", raw);
        return raw.to_string();
    };

    match origin.join(raw) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            debug!("Failed to resolve {:?} against {}: {}", raw, origin, e);
            raw.to_string()
        }
    }
}

/// Compute the effective URL and method for either kind of target.
///
/// Only string targets have an effective URL. The method comes from
/// `options` alone and defaults to `GET`; an empty method string counts as
/// unset.
pub fn normalize(
    target: &RequestTarget,
    options: Option<&RequestOptions>,
    origin: Option<&Url>,
) -> Normalized {
    let option_method = options
        .and_then(|o| o.method.as_deref())
        .filter(|m| !m.is_empty());

    let url = match target {
        RequestTarget::Url(raw) => Some(resolve_url(raw, origin)),
        RequestTarget::Descriptor(_) => None,
    };

    Normalized {
        url,
        method: option_method.unwrap_or("GET").to_string(),
    }
}
