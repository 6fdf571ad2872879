//! Result Reconciler
//!
//! Flattens the records of many location results into one dataset, tagging
//! each record with its location and dropping repeats of the same
//! `(name, address)` key. The first occurrence wins.

use crate::locations::Location;
use crate::storage::{ListingRecord, LocationResult};
use std::collections::HashSet;

/// A listing together with the location it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedRecord {
    pub location: Location,
    pub record: ListingRecord,
}

/// Deduplicated union of many location results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidatedDataset {
    records: Vec<ConsolidatedRecord>,
    sources: usize,
    records_seen: usize,
    duplicates_removed: usize,
}

impl ConsolidatedDataset {
    pub fn records(&self) -> &[ConsolidatedRecord] {
        &self.records
    }

    /// Number of location results merged
    pub fn sources(&self) -> usize {
        self.sources
    }

    /// Records before deduplication
    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Merges `results` in order, keeping the first record for each key
///
/// The key is the exact `(name, address)` pair, where a missing value is its
/// own "no value" marker: two records without an address are duplicates only
/// if their names match too, and a record without an address never matches
/// one that has an address.
pub fn reconcile(results: &[LocationResult]) -> ConsolidatedDataset {
    let mut seen: HashSet<(Option<&str>, Option<&str>)> = HashSet::new();
    let mut dataset = ConsolidatedDataset {
        sources: results.len(),
        ..Default::default()
    };

    for result in results {
        for record in result.records() {
            dataset.records_seen += 1;
            let key = (record.name.as_deref(), record.address.as_deref());
            if seen.insert(key) {
                dataset.records.push(ConsolidatedRecord {
                    location: result.location.clone(),
                    record: record.clone(),
                });
            } else {
                dataset.duplicates_removed += 1;
            }
        }
    }

    tracing::debug!(
        "Reconciled {} records from {} results, {} duplicates removed",
        dataset.records_seen,
        dataset.sources,
        dataset.duplicates_removed
    );
    dataset
}
