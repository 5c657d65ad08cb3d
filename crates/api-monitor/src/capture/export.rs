//! Offline helpers for JSON export files.

use super::types::CapturedCall;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0:?} does not contain a JSON array")]
    NotAnArray(PathBuf),
}

/// Read an export file back into captured calls.
pub fn load_export(path: &Path) -> Result<Vec<CapturedCall>, ExportError> {
    let json = fs::read_to_string(path)?;
    let calls: Vec<CapturedCall> = serde_json::from_str(&json)?;
    debug!("Loaded {} captured calls from {:?}", calls.len(), path);
    Ok(calls)
}

/// Split a JSON array file into one pretty-printed file per element.
///
/// Files are named `001.json`, `002.json`, ... in array order.
pub fn split_export(input: &Path, output_dir: &Path) -> Result<usize, ExportError> {
    let json = fs::read_to_string(input)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ExportError::NotAnArray(input.to_path_buf()));
    };
    write_split(&items, output_dir)
}

/// Write each item to its own numbered file under `output_dir`.
pub fn write_split<T: Serialize>(items: &[T], output_dir: &Path) -> Result<usize, ExportError> {
    fs::create_dir_all(output_dir)?;

    for (index, item) in items.iter().enumerate() {
        let path = output_dir.join(format!("{:03}.json", index + 1));
        fs::write(&path, serde_json::to_string_pretty(item)?)?;
        debug!("Wrote {:?}", path);
    }

    info!("Split {} entries into {:?}", items.len(), output_dir);
    Ok(items.len())
}
