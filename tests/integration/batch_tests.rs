//! Location list partitioning through the batch files

use listing_harvest::locations::{load_locations, save_all_locations, save_batches};
use listing_harvest::{partition, Location};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::num::NonZeroUsize;
use tempfile::TempDir;

#[test]
fn test_batch_size_one_gives_one_batch_per_location() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("locations.txt");
    fs::write(&input, "York\nBath\n").unwrap();

    let locations = load_locations(&input).unwrap();
    let batches = partition(
        &locations,
        NonZeroUsize::new(1).unwrap(),
        false,
        &mut StdRng::seed_from_u64(7),
    );
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].names(), vec!["York"]);
    assert_eq!(batches[1].names(), vec!["Bath"]);

    let out = dir.path().join("location_batches");
    let paths = save_batches(&out, &batches).unwrap();
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "York\n");
    assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "Bath\n");
}

#[test]
fn test_strategic_batches_cover_every_location_once() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("locations.txt");
    fs::write(
        &input,
        "London*\nLeeds*\nYork\nBath\nHull\nManchester*\nDerby\n",
    )
    .unwrap();
    let locations = load_locations(&input).unwrap();

    let batches = partition(
        &locations,
        NonZeroUsize::new(3).unwrap(),
        true,
        &mut StdRng::seed_from_u64(42),
    );
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.len() <= 3 && !b.is_empty()));
    // Three majors over three batches: one each
    assert!(batches.iter().all(|b| b.major_count() == 1));

    let mut seen: Vec<&str> = batches.iter().flat_map(|b| b.names()).collect();
    seen.sort_unstable();
    assert_eq!(
        seen,
        vec!["Bath", "Derby", "Hull", "Leeds", "London", "Manchester", "York"]
    );

    // Batch files drop the major marker and read back as plain locations
    let out = dir.path().join("location_batches");
    let paths = save_batches(&out, &batches).unwrap();
    let reread: usize = paths
        .iter()
        .map(|p| load_locations(p).unwrap())
        .inspect(|batch| assert!(batch.iter().all(|l| !l.is_major())))
        .map(|batch| batch.len())
        .sum();
    assert_eq!(reread, 7);

    let all = save_all_locations(&out, &locations).unwrap();
    let listed = load_locations(&all).unwrap();
    assert_eq!(listed.len(), 7);
    assert_eq!(listed[0], Location::new("London"));
}
