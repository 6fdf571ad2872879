//! Plain-text location lists
//!
//! Location list files hold one location per line. Batch files written here
//! are valid location list files, so a batch can be fed straight back into
//! `scrape --locations`.

use crate::locations::{Batch, Location};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the flattened list written next to the batch files
pub const ALL_LOCATIONS_FILE: &str = "all_locations.txt";

/// Reads a location list file
///
/// Blank lines are ignored and surrounding whitespace trimmed. A `*` anywhere
/// in a line tags the location as major and is stripped from its name.
pub fn load_locations(path: &Path) -> io::Result<Vec<Location>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().filter_map(Location::parse_marked).collect())
}

/// Writes each batch to `batch_<n>.txt` (1-based) inside `dir`
///
/// # Returns
///
/// The paths written, in batch order.
pub fn save_batches(dir: &Path, batches: &[Batch]) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(batches.len());
    for (index, batch) in batches.iter().enumerate() {
        let path = dir.join(format!("batch_{}.txt", index + 1));
        write_lines(&path, batch.locations())?;
        tracing::info!(
            "Saved batch {} with {} locations to {}",
            index + 1,
            batch.len(),
            path.display()
        );
        written.push(path);
    }

    Ok(written)
}

/// Writes every location, markers stripped, to `all_locations.txt` in `dir`
pub fn save_all_locations(dir: &Path, locations: &[Location]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(ALL_LOCATIONS_FILE);
    write_lines(&path, locations)?;
    tracing::info!("Saved all {} locations to {}", locations.len(), path.display());
    Ok(path)
}

fn write_lines(path: &Path, locations: &[Location]) -> io::Result<()> {
    let mut file = io::BufWriter::new(fs::File::create(path)?);
    for location in locations {
        writeln!(file, "{}", location.name())?;
    }
    file.flush()
}
