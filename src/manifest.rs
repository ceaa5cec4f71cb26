//! Upload manifest — an append-only JSON array recording every file
//! pushed to Disk, accumulated across runs. Each record is appended with
//! its own open/rewrite/close cycle so a crash mid-run loses at most the
//! in-flight item.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vk::photo::SizeTag;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One uploaded file: its name on Disk and the size class it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub file_name: String,
    pub size: SizeTag,
}

/// Read all records; a missing file is an empty manifest.
pub fn load_records(path: &Path) -> Result<Vec<ManifestRecord>, ManifestError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Append one record, creating the manifest if absent.
pub fn append_record(path: &Path, record: &ManifestRecord) -> Result<(), ManifestError> {
    let mut records = load_records(path)?;
    records.push(record.clone());
    let file = File::create(path)?;
    serde_json::to_writer(file, &records)?;
    Ok(())
}
