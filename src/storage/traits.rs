//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::state::ProgressState;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read artifact {path}: {message}")]
    InvalidArtifact { path: PathBuf, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record of a run's progress
///
/// The orchestrator is the only writer. Implementations must make `save`
/// atomic: a reader never observes a partially written state.
pub trait CheckpointStore {
    /// Reads the last saved state
    ///
    /// A missing or unreadable checkpoint is reported as `None`, never as an
    /// error: it only means there is nothing to resume.
    fn load(&self) -> Option<ProgressState>;

    /// Replaces the saved state with `state`
    fn save(&mut self, state: &ProgressState) -> StorageResult<()>;

    /// Removes the saved state; clearing an absent checkpoint succeeds
    fn clear(&mut self) -> StorageResult<()>;
}
