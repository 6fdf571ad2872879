//! Run coordinator - main scrape orchestration logic
//!
//! This module contains the run loop that ties everything together:
//! - Loading or creating the progress checkpoint
//! - Crawling each pending location through the page state machine
//! - Writing one result artifact per location
//! - Checkpointing after every location, success or failure
//! - Pacing between locations

use crate::config::Config;
use crate::crawler::machine::{crawl_location, CrawlSettings};
use crate::crawler::pacing::Pacer;
use crate::driver::{PageSession, WebDriverSession};
use crate::locations::Location;
use crate::state::ProgressState;
use crate::storage::{CheckpointStore, JsonCheckpointStore, LocationResult, ResultStore};
use crate::HarvestError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Results written during this run, in processing order
    pub results: Vec<LocationResult>,
    /// Artifact path of each entry in `results`
    pub artifacts: Vec<PathBuf>,
    /// Every completed location, including ones completed by earlier runs
    pub completed: Vec<Location>,
    /// Locations still pending (failed ones included)
    pub pending: Vec<Location>,
    /// Locations whose crawl failed during this run
    pub failed: Vec<Location>,
}

impl RunOutcome {
    /// Total listings collected during this run
    pub fn listings(&self) -> usize {
        self.results.iter().map(|r| r.total_restaurants).sum()
    }

    fn finish(mut self, progress: &ProgressState) -> Self {
        self.completed = progress.completed().to_vec();
        self.pending = progress.pending().to_vec();
        self
    }
}

/// Main run coordinator structure
pub struct Coordinator<S, C> {
    session: S,
    checkpoints: C,
    results: ResultStore,
    settings: CrawlSettings,
    pacer: Pacer,
}

impl<S: PageSession, C: CheckpointStore> Coordinator<S, C> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `session` - Page session owned by the run for its whole duration
    /// * `checkpoints` - Where progress is persisted
    /// * `results` - Where result artifacts are written
    /// * `settings` - Crawl settings for every location
    /// * `pacer` - Source of randomized pauses
    pub fn new(
        session: S,
        checkpoints: C,
        results: ResultStore,
        settings: CrawlSettings,
        pacer: Pacer,
    ) -> Self {
        Self {
            session,
            checkpoints,
            results,
            settings,
            pacer,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn checkpoints(&self) -> &C {
        &self.checkpoints
    }

    /// Gives the page session back, e.g. to close it
    pub fn into_session(self) -> S {
        self.session
    }

    /// Runs every pending location
    ///
    /// A saved checkpoint takes precedence over `locations`: its pending list
    /// becomes the work list and its completed locations are never crawled
    /// again. Without a checkpoint, `locations` is the work list.
    ///
    /// A location whose crawl or artifact write fails stays pending and the
    /// run moves on. The checkpoint is cleared once nothing is pending.
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome)` - The run went through every pending location
    /// * `Err(HarvestError::NoLocations)` - There was nothing to do
    /// * `Err(HarvestError::Storage)` - The checkpoint could not be saved
    pub async fn run(&mut self, locations: &[Location]) -> crate::Result<RunOutcome> {
        let saved = self
            .checkpoints
            .load()
            .filter(|s| !s.pending().is_empty() || !s.completed().is_empty());
        let mut progress = match saved {
            Some(state) => {
                tracing::info!(
                    "Resuming previous session: {} pending, {} completed (saved {})",
                    state.pending().len(),
                    state.completed().len(),
                    state.timestamp()
                );
                state
            }
            None => ProgressState::new(locations.to_vec()),
        };

        let mut outcome = RunOutcome::default();
        if progress.is_finished() {
            if progress.completed().is_empty() {
                return Err(HarvestError::NoLocations);
            }
            tracing::info!("All locations were already completed");
            self.clear_checkpoint();
            return Ok(outcome.finish(&progress));
        }

        self.checkpoints.save(&progress)?;

        let work = progress.pending().to_vec();
        let start_time = Instant::now();
        tracing::info!("Starting run over {} locations", work.len());

        for (position, location) in work.iter().enumerate() {
            if progress.is_completed(location) {
                continue;
            }

            tracing::info!(
                "[{}/{}] Scraping {}",
                position + 1,
                work.len(),
                location
            );

            match self.scrape_location(location).await {
                Ok((result, path)) => {
                    progress.mark_completed(location);
                    outcome.results.push(result);
                    outcome.artifacts.push(path);
                }
                Err(e) => {
                    tracing::error!("Failed to scrape {}: {}", location, e);
                    progress.touch();
                    outcome.failed.push(location.clone());
                }
            }

            self.checkpoints.save(&progress)?;
            tracing::info!(
                "Progress: {} completed, {} pending",
                progress.completed().len(),
                progress.pending().len()
            );

            if position + 1 < work.len() {
                self.pacer.between_locations().await;
            }
        }

        if progress.is_finished() {
            self.clear_checkpoint();
        } else {
            tracing::warn!(
                "{} locations still pending; run again to retry them",
                progress.pending().len()
            );
        }

        tracing::info!(
            "Run finished in {:?}: {} locations scraped, {} failed",
            start_time.elapsed(),
            outcome.results.len(),
            outcome.failed.len()
        );

        Ok(outcome.finish(&progress))
    }

    /// Crawls one location and writes its artifact
    async fn scrape_location(
        &mut self,
        location: &Location,
    ) -> crate::Result<(LocationResult, PathBuf)> {
        let report =
            crawl_location(&mut self.session, &self.settings, &mut self.pacer, location).await?;
        if report.skipped > 0 {
            tracing::warn!(
                "{} listings skipped for {}",
                report.skipped,
                location
            );
        }

        let result = LocationResult::new(location.clone(), report.records);
        let path = self.results.write(&result)?;
        Ok((result, path))
    }

    fn clear_checkpoint(&mut self) {
        if let Err(e) = self.checkpoints.clear() {
            tracing::warn!("Failed to clear checkpoint: {}", e);
        }
    }
}

/// Runs a complete scrape against a WebDriver browser
///
/// This function wires the production pieces together:
///
/// 1. Derive crawl settings from the configuration
/// 2. Open the checkpoint and result stores
/// 3. Start a browser session
/// 4. Run every pending location
/// 5. Close the browser, even if the run failed
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `locations` - Work list used when no checkpoint exists
///
/// # Returns
///
/// * `Ok(RunOutcome)` - Run completed (possibly with failed locations)
/// * `Err(HarvestError)` - Nothing to do, browser unavailable, or checkpoint unwritable
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::load_config;
/// use listing_harvest::crawler::run_scrape;
/// use listing_harvest::Location;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let outcome = run_scrape(&config, &[Location::new("York")]).await?;
/// println!("{} listings", outcome.listings());
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: &Config, locations: &[Location]) -> crate::Result<RunOutcome> {
    let settings = CrawlSettings::from_config(config)?;
    let mut checkpoints = JsonCheckpointStore::new(&config.output.checkpoint_path);
    let results = ResultStore::from_config(&config.output);
    let pacer = Pacer::new(config.pacing.clone(), StdRng::from_os_rng());

    // Do not start a browser when there is nothing to do
    match checkpoints.load() {
        Some(state) if !state.is_finished() => {}
        Some(state) if !state.completed().is_empty() => {
            tracing::info!("All locations were already completed");
            if let Err(e) = checkpoints.clear() {
                tracing::warn!("Failed to clear checkpoint: {}", e);
            }
            return Ok(RunOutcome::default().finish(&state));
        }
        _ if locations.is_empty() => return Err(HarvestError::NoLocations),
        _ => {}
    }

    let session = WebDriverSession::connect(&config.driver).await?;
    let mut coordinator = Coordinator::new(session, checkpoints, results, settings, pacer);
    let outcome = coordinator.run(locations).await;

    let mut session = coordinator.into_session();
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }

    outcome
}
