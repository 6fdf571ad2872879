//! Storage module for persisting run data
//!
//! This module handles everything written to disk during a scrape:
//! - Listing records and per-location results
//! - Result artifacts (one JSON file per crawled location)
//! - The progress checkpoint used to resume interrupted runs

mod checkpoint;
mod records;
mod results;
mod traits;

pub use checkpoint::JsonCheckpointStore;
pub use records::{ListingRecord, LocationResult};
pub use results::ResultStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `bytes` to `path` through a sibling temp file and a rename
///
/// Readers see either the previous content or the new content, never a
/// partial write. The parent directory is created if missing.
///
/// # Arguments
///
/// * `path` - Final location of the file
/// * `bytes` - Complete new content
pub fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };

    write().map_err(|source| {
        let _ = fs::remove_file(&tmp);
        StorageError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}
