//! Captured calls and the log that holds them.
//!
//! # Module Structure
//!
//! - `types` - `CapturedCall`, `CapturedBody`, id/timestamp/header helpers
//! - `decode` - JSON-then-text body decode pipeline
//! - `store` - `CaptureLog` in-memory store
//! - `export` - export file helpers (load, split)

mod decode;
mod export;
mod store;
mod types;

pub use decode::decode_body;
pub use export::{load_export, split_export, write_split, ExportError};
pub use store::CaptureLog;
pub use types::{capture_timestamp, flatten_headers, new_capture_id, CapturedBody, CapturedCall};
