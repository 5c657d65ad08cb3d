//! Types for captured calls.

use chrono::{SecondsFormat, Utc};
use hyper::HeaderMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One observed request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedCall {
    /// Capture time in unix millis followed by a random base-36 suffix
    pub id: String,
    pub url: String,
    pub method: String,
    /// RFC 3339 UTC with millisecond precision, taken when the response arrived
    pub timestamp: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Older exports name this field `response`
    #[serde(alias = "response")]
    pub body: CapturedBody,
}

/// Decoded response body.
///
/// Serialized untagged: a structured body appears as its JSON value and a
/// text body as a JSON string. Reading an export back therefore yields
/// `Text` for any top-level JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapturedBody {
    Text(String),
    Structured(Value),
}

impl CapturedBody {
    pub fn is_structured(&self) -> bool {
        matches!(self, CapturedBody::Structured(_))
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            CapturedBody::Structured(value) => Some(value),
            CapturedBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CapturedBody::Text(text) => Some(text),
            CapturedBody::Structured(_) => None,
        }
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Best-effort unique id: current unix millis plus a random suffix.
///
/// Two calls in the same millisecond collide only if their suffixes match.
pub fn new_capture_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", Utc::now().timestamp_millis(), suffix)
}

/// Current time as `2025-01-01T12:00:00.000Z`.
pub fn capture_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Flatten response headers into a name -> value map.
///
/// Repeated names are joined with `", "`. Values that are not valid UTF-8
/// are decoded lossily rather than dropped.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes());
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    flat
}
