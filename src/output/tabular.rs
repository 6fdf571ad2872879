//! CSV rendering of listing records

use crate::output::reconcile::ConsolidatedDataset;
use crate::output::OutputResult;
use crate::storage::ListingRecord;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Columns of a per-location CSV file
pub const LISTING_COLUMNS: [&str; 4] = ["name", "website", "phone", "address"];

/// Columns of the consolidated CSV file
pub const CONSOLIDATED_COLUMNS: [&str; 5] = ["name", "website", "phone", "address", "location"];

#[derive(Serialize)]
struct ListingRow<'a> {
    name: Option<&'a str>,
    website: Option<&'a str>,
    phone: Option<&'a str>,
    address: Option<&'a str>,
}

impl<'a> From<&'a ListingRecord> for ListingRow<'a> {
    fn from(record: &'a ListingRecord) -> Self {
        Self {
            name: record.name.as_deref(),
            website: record.website.as_deref(),
            phone: record.phone.as_deref(),
            address: record.address.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ConsolidatedRow<'a> {
    name: Option<&'a str>,
    website: Option<&'a str>,
    phone: Option<&'a str>,
    address: Option<&'a str>,
    location: &'a str,
}

/// The header is written explicitly so an empty input still yields one
fn writer<W: io::Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(out)
}

/// Writes a header row then one row per record; absent fields are empty cells
pub fn write_listing_rows<W: io::Write>(records: &[ListingRecord], out: W) -> OutputResult<()> {
    let mut csv = writer(out);
    csv.write_record(LISTING_COLUMNS)?;
    for record in records {
        csv.serialize(ListingRow::from(record))?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the consolidated dataset with a trailing `location` column
pub fn write_consolidated_rows<W: io::Write>(
    dataset: &ConsolidatedDataset,
    out: W,
) -> OutputResult<()> {
    let mut csv = writer(out);
    csv.write_record(CONSOLIDATED_COLUMNS)?;
    for entry in dataset.records() {
        let record = &entry.record;
        csv.serialize(ConsolidatedRow {
            name: record.name.as_deref(),
            website: record.website.as_deref(),
            phone: record.phone.as_deref(),
            address: record.address.as_deref(),
            location: entry.location.name(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Sibling CSV path for a JSON artifact
pub fn csv_path_for(artifact: &Path) -> PathBuf {
    artifact.with_extension("csv")
}
