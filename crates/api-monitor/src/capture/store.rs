//! In-memory capture log.

use super::export::ExportError;
use super::types::CapturedCall;
use parking_lot::RwLock;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Ordered log of captured calls, in capture order.
///
/// Every append and every clear is a single short write-lock section, so
/// readers always see a consistent snapshot.
#[derive(Debug, Default)]
pub struct CaptureLog {
    entries: RwLock<Vec<CapturedCall>>,
}

impl CaptureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call to the end of the log
    pub fn record(&self, call: CapturedCall) {
        self.entries.write().push(call);
    }

    /// Replace the log with an empty one
    pub fn clear(&self) {
        *self.entries.write() = Vec::new();
    }

    /// Snapshot of every entry in capture order
    pub fn all(&self) -> Vec<CapturedCall> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Entries whose url contains `pattern` (case-sensitive, no wildcards)
    pub fn get_by_url(&self, pattern: &str) -> Vec<CapturedCall> {
        self.entries
            .read()
            .iter()
            .filter(|call| call.url.contains(pattern))
            .cloned()
            .collect()
    }

    /// Entries whose url matches `pattern` anywhere
    pub fn get_by_url_matching(&self, pattern: &Regex) -> Vec<CapturedCall> {
        self.entries
            .read()
            .iter()
            .filter(|call| pattern.is_match(&call.url))
            .cloned()
            .collect()
    }

    /// Pretty-printed JSON array of the whole log
    pub fn to_json(&self) -> String {
        let entries = self.entries.read();
        match serde_json::to_string_pretty(&*entries) {
            Ok(json) => json,
            Err(e) => {
                // Only string-keyed maps and JSON values are stored, so this is unreachable in practice
                warn!("Failed to serialize capture log: {}", e);
                "[]".to_string()
            }
        }
    }

    /// Write the JSON export to `path`, returning the number of entries
    pub fn save_to_file(&self, path: &Path) -> Result<usize, ExportError> {
        let entries = self.all();
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(path, json)?;
        info!("Saved {} captured calls to {:?}", entries.len(), path);
        Ok(entries.len())
    }
}
