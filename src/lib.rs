//! Listing-Harvest: a resumable local-business listing collector
//!
//! This crate drives a browser through local search results for many
//! locations, one location at a time, and persists one result artifact per
//! location together with a checkpoint so a multi-hour run survives crashes
//! and manual termination. Offline helpers split location lists into batches,
//! convert result artifacts to CSV and reconcile repeated runs into one
//! deduplicated dataset.

pub mod config;
pub mod crawler;
pub mod driver;
pub mod locations;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Listing-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page driver error: {0}")]
    Driver(#[from] driver::DriverError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("No locations to process")]
    NoLocations,

    #[error("No result artifacts found in {dir}")]
    NoArtifacts { dir: String },

    #[error("All {attempted} conversions failed")]
    AllConversionsFailed { attempted: usize },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Listing-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, RunOutcome};
pub use locations::{partition, Batch, Location};
pub use output::{reconcile, ConsolidatedDataset};
pub use state::{CrawlState, ProgressState};
pub use storage::{ListingRecord, LocationResult};
