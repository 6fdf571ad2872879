//! JSON file checkpoint store

use crate::state::ProgressState;
use crate::storage::traits::{CheckpointStore, StorageResult};
use crate::storage::write_atomic;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Checkpoint kept in a single pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> Option<ProgressState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable checkpoint {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_str::<ProgressState>(&content) {
            Ok(state) => Some(state.normalized()),
            Err(e) => {
                tracing::warn!(
                    "Ignoring corrupt checkpoint {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn save(&mut self, state: &ProgressState) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        write_atomic(&self.path, &bytes)?;
        tracing::debug!(
            "Checkpoint saved: {} pending, {} completed",
            state.pending().len(),
            state.completed().len()
        );
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Cleared checkpoint {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
