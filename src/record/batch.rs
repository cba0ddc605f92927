//! Record batch loading
//!
//! Accepts either a JSON array of records or the annotation tool's native
//! dump: one JSON record after another, usually one per line.

use super::Record;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors while reading the record batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("could not read record batch {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record batch: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse records from JSON text.
pub fn parse_batch(text: &str) -> Result<Vec<Record>, BatchError> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }
    serde_json::Deserializer::from_str(text)
        .into_iter::<Record>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(BatchError::from)
}

/// Read and parse the record batch at `path`.
pub fn load_batch(path: &Path) -> Result<Vec<Record>, BatchError> {
    let text = std::fs::read_to_string(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_batch(&text)
}
