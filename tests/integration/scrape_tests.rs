//! End-to-end scrape runs over scripted pages

use crate::support::{checkpoint_path, coordinator, result_store, with_location, Listing};
use listing_harvest::driver::MemorySession;
use listing_harvest::storage::{CheckpointStore, JsonCheckpointStore, ResultStore};
use listing_harvest::{HarvestError, Location, ProgressState};
use std::fs;
use tempfile::TempDir;

fn names(locations: &[Location]) -> Vec<&str> {
    locations.iter().map(Location::name).collect()
}

#[tokio::test]
async fn test_failed_listing_is_skipped_and_others_kept() {
    let dir = TempDir::new().unwrap();
    let session = with_location(
        MemorySession::new(),
        "York",
        &[
            Listing::Named("Jerk Hut", "1 Stonegate, York"),
            Listing::Broken,
            Listing::Named("Island Grill", "9 Micklegate, York"),
        ],
    );

    let mut coordinator = coordinator(session, dir.path());
    let outcome = coordinator.run(&[Location::new("York")]).await.unwrap();

    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.artifacts.len(), 1);

    let result = ResultStore::read(&outcome.artifacts[0]).unwrap();
    assert_eq!(result.location, Location::new("York"));
    assert_eq!(result.total_restaurants, 2);
    let scraped: Vec<Option<&str>> = result
        .records()
        .iter()
        .map(|r| r.name.as_deref())
        .collect();
    assert_eq!(scraped, vec![Some("Jerk Hut"), Some("Island Grill")]);
    assert_eq!(
        result.records()[1].address.as_deref(),
        Some("9 Micklegate, York")
    );
    assert!(result.records().iter().all(|r| r.phone.is_none()));

    // Finished runs leave no checkpoint behind
    assert!(!checkpoint_path(dir.path()).exists());
}

#[tokio::test]
async fn test_resume_skips_completed_locations() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonCheckpointStore::new(checkpoint_path(dir.path()));
    let saved = ProgressState::from_parts(vec![Location::new("Leeds")], vec![Location::new("York")]);
    store.save(&saved).unwrap();

    let session = with_location(
        with_location(
            MemorySession::new(),
            "York",
            &[Listing::Named("Jerk Hut", "1 Stonegate, York")],
        ),
        "Leeds",
        &[Listing::Named("Rudie's", "2 Call Lane, Leeds")],
    );

    let mut coordinator = coordinator(session, dir.path());
    // The checkpoint wins over the location list passed in
    let outcome = coordinator
        .run(&[Location::new("York"), Location::new("Bath")])
        .await
        .unwrap();

    assert_eq!(names(&outcome.completed), vec!["York", "Leeds"]);
    assert!(outcome.pending.is_empty());
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].location, Location::new("Leeds"));

    let navigations = coordinator.session().navigations();
    assert_eq!(navigations.len(), 1);
    assert!(navigations[0].contains("in+Leeds"));

    assert!(coordinator.checkpoints().load().is_none());
}

#[tokio::test]
async fn test_interrupted_run_resumes_where_it_stopped() {
    let dir = TempDir::new().unwrap();
    let locations = vec![
        Location::new("York"),
        Location::new("Hull"),
        Location::new("Bath"),
    ];

    // Hull cannot be loaded in the first run
    let first = with_location(
        with_location(
            MemorySession::new(),
            "York",
            &[Listing::Named("Jerk Hut", "1 Stonegate, York")],
        ),
        "Bath",
        &[Listing::Named("Turtle Bay", "4 Milsom St, Bath")],
    );
    let mut run = coordinator(first, dir.path());
    let outcome = run.run(&locations).await.unwrap();

    assert_eq!(names(&outcome.failed), vec!["Hull"]);
    assert_eq!(names(&outcome.completed), vec!["York", "Bath"]);
    assert_eq!(names(&outcome.pending), vec!["Hull"]);

    let saved = JsonCheckpointStore::new(checkpoint_path(dir.path()))
        .load()
        .expect("checkpoint kept while work is pending");
    assert_eq!(names(saved.pending()), vec!["Hull"]);
    assert_eq!(names(saved.completed()), vec!["York", "Bath"]);

    // Second run only touches the remaining location
    let second = with_location(
        MemorySession::new(),
        "Hull",
        &[Listing::Named("Caribbean Kitchen", "7 Whitefriargate, Hull")],
    );
    let mut run = coordinator(second, dir.path());
    let outcome = run.run(&locations).await.unwrap();

    assert!(outcome.failed.is_empty());
    assert_eq!(names(&outcome.completed), vec!["York", "Bath", "Hull"]);
    assert_eq!(run.session().navigations().len(), 1);
    assert!(!checkpoint_path(dir.path()).exists());

    // One artifact per completed location across both runs
    assert_eq!(result_store(dir.path()).list().unwrap().len(), 3);
}

#[tokio::test]
async fn test_checkpoint_file_layout() {
    let dir = TempDir::new().unwrap();
    let path = checkpoint_path(dir.path());
    let mut store = JsonCheckpointStore::new(&path);

    let mut state = ProgressState::new(vec![Location::new("York"), Location::new("Bath")]);
    assert!(state.mark_completed(&Location::new("York")));
    store.save(&state).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["locations"], serde_json::json!(["Bath"]));
    assert_eq!(raw["completed"], serde_json::json!(["York"]));
    assert!(raw["timestamp"].is_string());

    let loaded = store.load().unwrap();
    assert_eq!(loaded.pending(), state.pending());
    assert_eq!(loaded.completed(), state.completed());

    store.clear().unwrap();
    assert!(store.load().is_none());
    // Clearing twice is fine
    store.clear().unwrap();
}

#[tokio::test]
async fn test_run_without_locations_or_checkpoint() {
    let dir = TempDir::new().unwrap();
    let mut run = coordinator(MemorySession::new(), dir.path());
    let err = run.run(&[]).await.unwrap_err();
    assert!(matches!(err, HarvestError::NoLocations));
    assert!(run.session().navigations().is_empty());
}
