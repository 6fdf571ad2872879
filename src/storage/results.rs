//! Result artifact store
//!
//! One JSON artifact is written per successfully crawled location, named
//! `<prefix>_<slug>_<YYYYMMDD_HHMMSS>.json`. Artifacts are never rewritten:
//! crawling a location again produces a new file.

use crate::config::OutputConfig;
use crate::storage::records::LocationResult;
use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::write_atomic;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory of result artifacts sharing a file prefix
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
    prefix: String,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.results_dir, &config.file_prefix)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// File name the artifact for `result` is stored under
    pub fn file_name(&self, result: &LocationResult) -> String {
        format!(
            "{}_{}_{}.json",
            self.prefix,
            result.location.slug(),
            result.scrape_date.format("%Y%m%d_%H%M%S")
        )
    }

    /// Writes one artifact atomically
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the new artifact
    /// * `Err(StorageError)` - The directory or file could not be written
    pub fn write(&self, result: &LocationResult) -> StorageResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(self.file_name(result));
        let bytes = serde_json::to_vec_pretty(result)?;
        write_atomic(&path, &bytes)?;
        tracing::info!(
            "Saved {} listings for {} to {}",
            result.total_restaurants,
            result.location,
            path.display()
        );
        Ok(path)
    }

    /// Lists every artifact in the directory, sorted by file name
    ///
    /// A missing directory holds no artifacts.
    pub fn list(&self) -> StorageResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let lead = format!("{}_", self.prefix);
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&lead) && name.ends_with(".json") && entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Reads one artifact
    pub fn read(path: &Path) -> StorageResult<LocationResult> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| StorageError::InvalidArtifact {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
