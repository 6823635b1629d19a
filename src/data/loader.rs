//! Product identifier loading from JSON or CSV files
//!
//! JSON files may contain `//` line comments, which are stripped before
//! parsing. Every string value found anywhere in the document is a candidate
//! identifier. CSV files contribute each trimmed cell. Candidates that are not
//! valid identifiers are logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::ProductId;

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*").expect("valid regex"));

/// Errors that can occur when loading identifiers
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file extension is neither `.json` nor `.csv`
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON document is malformed
    #[error("Failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The CSV file is malformed
    #[error("Failed to parse CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Loads product identifiers from `path`
///
/// # Arguments
/// * `path` - A `.json` or `.csv` file (extension matched case-insensitively)
///
/// # Returns
/// * `Ok(Vec<ProductId>)` - Valid identifiers in file order, duplicates kept
/// * `Err(LoadError)` - If the format is unsupported or the file is unreadable
pub fn load_ids(path: impl AsRef<Path>) -> Result<Vec<ProductId>, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let read = || {
        fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let ids = match extension.as_str() {
        "json" => parse_json(&read()?).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        "csv" => parse_csv(&read()?).map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(LoadError::UnsupportedFormat(extension)),
    };

    debug!(path = %path.display(), count = ids.len(), "Loaded product identifiers");
    Ok(ids)
}

/// Parses commented JSON and collects identifier strings in document order
pub fn parse_json(text: &str) -> Result<Vec<ProductId>, serde_json::Error> {
    let stripped = LINE_COMMENT.replace_all(text, "");
    let value: Value = serde_json::from_str(&stripped)?;
    let mut ids = Vec::new();
    collect_strings(&value, &mut ids);
    Ok(ids)
}

/// Reads every cell of every CSV row and keeps the valid identifiers
///
/// Rows may have differing lengths; quoted cells are unquoted before
/// validation.
pub fn parse_csv(text: &str) -> Result<Vec<ProductId>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut ids = Vec::new();
    for row in reader.records() {
        let row = row?;
        ids.extend(
            row.iter()
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .filter_map(validate),
        );
    }
    Ok(ids)
}

fn collect_strings(value: &Value, ids: &mut Vec<ProductId>) {
    match value {
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, ids)),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, ids)),
        Value::String(s) => ids.extend(validate(s)),
        _ => {}
    }
}

fn validate(candidate: &str) -> Option<ProductId> {
    match ProductId::parse(candidate) {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(value = candidate, "Invalid product id skipped");
            None
        }
    }
}
