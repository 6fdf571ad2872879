//! Output module for turning result artifacts into tables
//!
//! This module handles:
//! - Converting result artifacts to per-location CSV files
//! - Reconciling every artifact into one deduplicated CSV dataset
//! - Printing run, conversion and merge summaries

mod reconcile;
pub mod stats;
mod tabular;

pub use reconcile::{reconcile, ConsolidatedDataset, ConsolidatedRecord};
pub use stats::{print_conversion_summary, print_merge_summary, print_run_summary};
pub use tabular::{
    csv_path_for, write_consolidated_rows, write_listing_rows, CONSOLIDATED_COLUMNS,
    LISTING_COLUMNS,
};

use crate::storage::{write_atomic, LocationResult, ResultStore, StorageError};
use crate::HarvestError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing tabular output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Outcome of converting every artifact
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// CSV files written
    pub converted: Vec<PathBuf>,
    /// Artifacts that could not be converted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl ConversionReport {
    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Outcome of merging every artifact into one dataset
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub artifacts_read: usize,
    pub artifacts_skipped: usize,
    pub dataset: ConsolidatedDataset,
    pub output: PathBuf,
}

/// Converts one result artifact to CSV
///
/// # Arguments
///
/// * `artifact` - JSON result artifact to read
/// * `csv_path` - CSV file to create or overwrite
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written (header excluded)
/// * `Err(OutputError)` - The artifact was unreadable or the CSV unwritable
pub fn convert_result_file(artifact: &Path, csv_path: &Path) -> OutputResult<usize> {
    let result = ResultStore::read(artifact)?;
    let mut file = io::BufWriter::new(fs::File::create(csv_path)?);
    write_listing_rows(result.records(), &mut file)?;
    file.flush()?;

    tracing::info!(
        "Converted {} listings from {} to {}",
        result.records().len(),
        artifact.display(),
        csv_path.display()
    );
    Ok(result.records().len())
}

/// Converts every artifact in `store` to a sibling CSV file
///
/// # Returns
///
/// * `Ok(ConversionReport)` - At least one artifact was converted
/// * `Err(HarvestError::NoArtifacts)` - There was nothing to convert
/// * `Err(HarvestError::AllConversionsFailed)` - Every conversion failed
pub fn convert_all(store: &ResultStore) -> crate::Result<ConversionReport> {
    let artifacts = store.list()?;
    if artifacts.is_empty() {
        return Err(HarvestError::NoArtifacts {
            dir: store.dir().display().to_string(),
        });
    }
    tracing::info!("Found {} result files to convert", artifacts.len());

    let mut report = ConversionReport::default();
    for artifact in artifacts {
        let csv_path = csv_path_for(&artifact);
        match convert_result_file(&artifact, &csv_path) {
            Ok(_) => report.converted.push(csv_path),
            Err(e) => {
                tracing::error!("Failed to convert {}: {}", artifact.display(), e);
                report.failed.push((artifact, e.to_string()));
            }
        }
    }

    if report.converted.is_empty() {
        return Err(HarvestError::AllConversionsFailed {
            attempted: report.attempted(),
        });
    }
    Ok(report)
}

/// Reconciles every readable artifact in `store` into one CSV at `output`
///
/// Unreadable artifacts are logged and skipped. The CSV is replaced
/// atomically.
pub fn merge_results(store: &ResultStore, output: &Path) -> crate::Result<MergeReport> {
    let artifacts = store.list()?;
    let mut results: Vec<LocationResult> = Vec::with_capacity(artifacts.len());
    let mut skipped = 0;

    for artifact in &artifacts {
        match ResultStore::read(artifact) {
            Ok(result) => {
                tracing::info!(
                    "Processed {} - {} ({} listings)",
                    artifact.display(),
                    result.location,
                    result.records().len()
                );
                results.push(result);
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!("Skipping {}: {}", artifact.display(), e);
            }
        }
    }

    if results.is_empty() {
        return Err(HarvestError::NoArtifacts {
            dir: store.dir().display().to_string(),
        });
    }

    let dataset = reconcile(&results);
    let mut buf = Vec::new();
    write_consolidated_rows(&dataset, &mut buf)?;
    write_atomic(output, &buf)?;
    tracing::info!(
        "Wrote {} unique listings to {}",
        dataset.len(),
        output.display()
    );

    Ok(MergeReport {
        artifacts_read: results.len(),
        artifacts_skipped: skipped,
        dataset,
        output: output.to_path_buf(),
    })
}
