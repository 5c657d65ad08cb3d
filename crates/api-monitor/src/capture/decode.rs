//! Two-step body decode: JSON first, text only if JSON fails.

use super::types::CapturedBody;
use crate::dispatch::{duplicate_response, MonitorResponse};
use http_body_util::BodyExt;
use hyper::body::Bytes;
use serde_json::Value;
use tracing::trace;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode the body of `response` without consuming it.
///
/// Each step reads its own duplicate, so the caller's response stays
/// readable either way.
pub async fn decode_body(response: &MonitorResponse) -> CapturedBody {
    let bytes = read_duplicate(response).await;
    match serde_json::from_slice::<Value>(strip_bom(&bytes)) {
        Ok(value) => CapturedBody::Structured(value),
        Err(e) => {
            trace!("Response body is not JSON ({}), decoding as text", e);
            let bytes = read_duplicate(response).await;
            CapturedBody::Text(String::from_utf8_lossy(strip_bom(&bytes)).into_owned())
        }
    }
}

async fn read_duplicate(response: &MonitorResponse) -> Bytes {
    match duplicate_response(response).into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}
