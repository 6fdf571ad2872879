//! Location Partitioner
//!
//! Splits a flat list of locations into batches. Sequential mode chunks the
//! list in order; strategic mode shuffles major and other locations separately
//! and spreads the majors as evenly as possible across the batches.

use crate::locations::{Batch, Location};
use rand::seq::SliceRandom;
use rand::Rng;
use std::num::NonZeroUsize;

/// Splits `locations` into batches of at most `batch_size`
///
/// # Arguments
///
/// * `locations` - Locations in input order
/// * `batch_size` - Maximum number of locations per batch
/// * `strategic` - Spread major locations across batches instead of chunking
/// * `rng` - Random source used to shuffle in strategic mode
///
/// # Returns
///
/// Non-empty batches; an empty input yields no batches.
pub fn partition<R: Rng + ?Sized>(
    locations: &[Location],
    batch_size: NonZeroUsize,
    strategic: bool,
    rng: &mut R,
) -> Vec<Batch> {
    if strategic {
        partition_strategic(locations, batch_size, rng)
    } else {
        partition_sequential(locations, batch_size)
    }
}

/// Contiguous chunking that preserves input order
///
/// Only the last batch may be smaller than `batch_size`.
pub fn partition_sequential(locations: &[Location], batch_size: NonZeroUsize) -> Vec<Batch> {
    locations
        .chunks(batch_size.get())
        .map(|chunk| Batch::new(chunk.to_vec()))
        .collect()
}

/// Distributes major locations evenly, then fills with the rest
///
/// The batch count is `ceil(total / batch_size)`. Each batch first receives its
/// share of the shuffled major locations (at most `ceil(majors / batches)`,
/// never fewer than `floor(majors / batches)`), then is topped up to
/// `batch_size` with shuffled other locations. Batches left empty are dropped.
pub fn partition_strategic<R: Rng + ?Sized>(
    locations: &[Location],
    batch_size: NonZeroUsize,
    rng: &mut R,
) -> Vec<Batch> {
    if locations.is_empty() {
        return Vec::new();
    }

    let (mut majors, mut others): (Vec<Location>, Vec<Location>) =
        locations.iter().cloned().partition(Location::is_major);
    majors.shuffle(rng);
    others.shuffle(rng);

    let size = batch_size.get();
    let batch_count = locations.len().div_ceil(size);
    let base_share = majors.len() / batch_count;
    let extra = majors.len() % batch_count;

    let mut majors = majors.into_iter();
    let mut others = others.into_iter();
    let mut batches = Vec::with_capacity(batch_count);

    for index in 0..batch_count {
        let share = base_share + usize::from(index < extra);
        let mut batch: Vec<Location> = majors.by_ref().take(share).collect();

        while batch.len() < size {
            match others.next() {
                Some(location) => batch.push(location),
                None => break,
            }
        }

        if !batch.is_empty() {
            batches.push(Batch::new(batch));
        }
    }

    batches
}
