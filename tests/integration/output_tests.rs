//! Conversion and merging of scrape results

use crate::support::{coordinator, result_store, with_location, Listing};
use listing_harvest::driver::MemorySession;
use listing_harvest::output::{convert_all, merge_results};
use listing_harvest::{HarvestError, Location};
use std::fs;
use tempfile::TempDir;

fn rows(path: &std::path::Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.records().map(Result::unwrap).collect()
}

/// Scrapes York and Leeds, where one chain shows up in both searches
async fn scrape_two_locations(dir: &std::path::Path) {
    let session = with_location(
        with_location(
            MemorySession::new(),
            "York",
            &[
                Listing::Named("Jerk Hut", "1 Stonegate"),
                Listing::Named("Turtle Bay", "Regional Office"),
            ],
        ),
        "Leeds",
        &[
            Listing::Named("Turtle Bay", "Regional Office"),
            Listing::Named("Rudie's", "2 Call Lane"),
        ],
    );
    let mut run = coordinator(session, dir);
    let outcome = run
        .run(&[Location::new("York"), Location::new("Leeds")])
        .await
        .unwrap();
    assert_eq!(outcome.listings(), 4);
}

#[tokio::test]
async fn test_merge_removes_cross_location_duplicates() {
    let dir = TempDir::new().unwrap();
    scrape_two_locations(dir.path()).await;

    let output = dir.path().join("all_restaurants.csv");
    let report = merge_results(&result_store(dir.path()), &output).unwrap();
    assert_eq!(report.artifacts_read, 2);
    assert_eq!(report.artifacts_skipped, 0);
    assert_eq!(report.dataset.records_seen(), 4);
    assert_eq!(report.dataset.duplicates_removed(), 1);
    assert_eq!(report.dataset.len(), 3);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<&str> = reader.headers().unwrap().iter().collect();
    assert_eq!(headers, vec!["name", "website", "phone", "address", "location"]);
    let mut names: Vec<String> = rows(&output).iter().map(|r| r[0].to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["Jerk Hut", "Rudie's", "Turtle Bay"]);
}

#[tokio::test]
async fn test_merge_skips_unreadable_artifacts() {
    let dir = TempDir::new().unwrap();
    scrape_two_locations(dir.path()).await;

    let store = result_store(dir.path());
    fs::write(store.dir().join("restaurants_broken_20240101_000000.json"), "{not json").unwrap();

    let report = merge_results(&store, &dir.path().join("all.csv")).unwrap();
    assert_eq!(report.artifacts_read, 2);
    assert_eq!(report.artifacts_skipped, 1);
    assert_eq!(report.dataset.len(), 3);
}

#[tokio::test]
async fn test_convert_all_writes_csv_next_to_each_artifact() {
    let dir = TempDir::new().unwrap();
    scrape_two_locations(dir.path()).await;

    let report = convert_all(&result_store(dir.path())).unwrap();
    assert_eq!(report.converted.len(), 2);
    assert!(report.failed.is_empty());

    for csv_path in &report.converted {
        assert_eq!(csv_path.extension().unwrap(), "csv");
        assert!(csv_path.with_extension("json").exists());
        let records = rows(csv_path);
        assert_eq!(records.len(), 2);
        // Nothing was found for website or phone
        assert!(records.iter().all(|r| r[1].is_empty() && r[2].is_empty()));
    }
}

#[test]
fn test_merge_without_results() {
    let dir = TempDir::new().unwrap();
    let err = merge_results(&result_store(dir.path()), &dir.path().join("all.csv")).unwrap_err();
    assert!(matches!(err, HarvestError::NoArtifacts { .. }));
    assert!(matches!(
        convert_all(&result_store(dir.path())).unwrap_err(),
        HarvestError::NoArtifacts { .. }
    ));
}
