//! Human-readable summaries
//!
//! This module prints the end-of-command summaries for scrape runs,
//! conversions and merges.

use crate::crawler::RunOutcome;
use crate::output::{ConversionReport, MergeReport};

/// Prints a scrape run summary to stdout
///
/// # Arguments
///
/// * `outcome` - The outcome returned by the coordinator
pub fn print_run_summary(outcome: &RunOutcome) {
    println!("=== Scrape Summary ===\n");

    println!("Locations:");
    println!("  Scraped this run: {}", outcome.results.len());
    println!("  Failed this run: {}", outcome.failed.len());
    println!("  Completed overall: {}", outcome.completed.len());
    println!("  Still pending: {}", outcome.pending.len());
    println!();

    println!("Listings collected: {}", outcome.listings());
    println!();

    if !outcome.artifacts.is_empty() {
        println!("Result files ({}):", outcome.artifacts.len());
        for (result, path) in outcome.results.iter().zip(&outcome.artifacts) {
            println!(
                "  - {} ({} listings): {}",
                result.location,
                result.total_restaurants,
                path.display()
            );
        }
        println!();
    }

    if !outcome.pending.is_empty() {
        println!("Pending locations ({}):", outcome.pending.len());
        for location in &outcome.pending {
            println!("  - {}", location);
        }
        println!();
        println!("Run the scrape again to resume from the checkpoint.");
    }
}

/// Prints a conversion summary to stdout
pub fn print_conversion_summary(report: &ConversionReport) {
    println!("=== Conversion Summary ===\n");
    println!("  Total files processed: {}", report.attempted());
    println!("  Successfully converted: {}", report.converted.len());
    println!("  Failed conversions: {}", report.failed.len());

    if !report.failed.is_empty() {
        println!();
        println!("Failures:");
        for (path, reason) in &report.failed {
            println!("  - {}: {}", path.display(), reason);
        }
    }
}

/// Prints a merge summary to stdout
pub fn print_merge_summary(report: &MergeReport) {
    let dataset = &report.dataset;
    let rate = if dataset.records_seen() > 0 {
        (dataset.duplicates_removed() as f64 / dataset.records_seen() as f64) * 100.0
    } else {
        0.0
    };

    println!("=== Merge Summary ===\n");
    println!("  Result files read: {}", report.artifacts_read);
    if report.artifacts_skipped > 0 {
        println!("  Result files skipped: {}", report.artifacts_skipped);
    }
    println!("  Listings seen: {}", dataset.records_seen());
    println!(
        "  Duplicates removed: {} ({:.1}%)",
        dataset.duplicates_removed(),
        rate
    );
    println!("  Unique listings: {}", dataset.len());
    println!();
    println!("Written to {}", report.output.display());
}
