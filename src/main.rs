//! Listing-Harvest main entry point
//!
//! This is the command-line interface for the Listing-Harvest scraper.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use listing_harvest::config::{load_config_with_hash, Config};
use listing_harvest::crawler::run_scrape;
use listing_harvest::locations::{load_locations, partition, save_all_locations, save_batches};
use listing_harvest::output::{
    convert_all, convert_result_file, csv_path_for, merge_results, print_conversion_summary,
    print_merge_summary, print_run_summary,
};
use listing_harvest::storage::{CheckpointStore, JsonCheckpointStore, ResultStore};
use listing_harvest::{HarvestError, Location};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Listing-Harvest: a resumable local-business listing collector
///
/// Listing-Harvest searches local business results location by location,
/// checkpointing after every location so long runs can be stopped and
/// resumed. Offline commands split location lists into batches and turn the
/// collected results into CSV files.
#[derive(Parser, Debug)]
#[command(name = "listing-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable local-business listing collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a location list into batch files
    Batch {
        /// Location list, one per line; a `*` marks a major location
        #[arg(value_name = "LOCATIONS_FILE")]
        locations: PathBuf,

        /// Locations per batch (defaults to the configured batch size)
        #[arg(long)]
        size: Option<NonZeroUsize>,

        /// Spread major locations evenly across batches
        #[arg(long)]
        strategic: bool,

        /// Directory for the batch files (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Scrape listings for every pending location
    Scrape {
        /// Location list used when there is no checkpoint to resume
        #[arg(long, value_name = "FILE")]
        locations: Option<PathBuf>,

        /// Require an existing checkpoint and resume it
        #[arg(long, conflicts_with = "fresh")]
        resume: bool,

        /// Discard any checkpoint and start over
        #[arg(long, conflicts_with = "resume")]
        fresh: bool,

        /// Show what would be scraped without opening a browser
        #[arg(long)]
        dry_run: bool,
    },

    /// Convert result files to CSV
    Convert {
        /// A single result file; omit to convert every result file
        #[arg(value_name = "FILE", conflicts_with = "all")]
        file: Option<PathBuf>,

        /// Convert every result file in the results directory
        #[arg(long)]
        all: bool,
    },

    /// Merge every result file into one deduplicated CSV
    Merge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Batch {
            locations,
            size,
            strategic,
            output_dir,
        } => handle_batch(&config, &locations, size, strategic, output_dir),
        Command::Scrape {
            locations,
            resume,
            fresh,
            dry_run,
        } => handle_scrape(&config, locations.as_deref(), resume, fresh, dry_run).await,
        Command::Convert { file, .. } => handle_convert(&config, file.as_deref()),
        Command::Merge => handle_merge(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvest=info,warn"),
            1 => EnvFilter::new("listing_harvest=debug,info"),
            2 => EnvFilter::new("listing_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `batch`: partitions a location list and writes the batch files
fn handle_batch(
    config: &Config,
    locations_file: &Path,
    size: Option<NonZeroUsize>,
    strategic: bool,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let locations = load_locations(locations_file)
        .with_context(|| format!("Failed to read {}", locations_file.display()))?;
    if locations.is_empty() {
        bail!(HarvestError::NoLocations);
    }

    let size = match size {
        Some(size) => size,
        None => NonZeroUsize::new(config.batching.batch_size)
            .context("batch-size must be a positive integer")?,
    };
    let strategic = strategic || config.batching.strategic;
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.batching.output_dir));

    let mut rng = StdRng::from_os_rng();
    let batches = partition(&locations, size, strategic, &mut rng);
    let paths = save_batches(&output_dir, &batches)
        .with_context(|| format!("Failed to write batches to {}", output_dir.display()))?;
    let all = save_all_locations(&output_dir, &locations)
        .with_context(|| format!("Failed to write location list to {}", output_dir.display()))?;

    let majors = locations.iter().filter(|l| l.is_major()).count();
    println!("=== Batches ===\n");
    println!("  Locations: {} ({} major)", locations.len(), majors);
    println!(
        "  Mode: {}",
        if strategic { "strategic" } else { "sequential" }
    );
    println!("  Batch size: {}", size);
    println!();
    for (batch, path) in batches.iter().zip(&paths) {
        println!(
            "  {} - {} locations ({} major)",
            path.display(),
            batch.len(),
            batch.major_count()
        );
    }
    println!("\nAll locations written to {}", all.display());

    Ok(())
}

/// Handles `scrape`: runs or resumes the scraper
async fn handle_scrape(
    config: &Config,
    locations_file: Option<&Path>,
    resume: bool,
    fresh: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut checkpoints = JsonCheckpointStore::new(&config.output.checkpoint_path);

    let saved = if fresh { None } else { checkpoints.load() };
    if resume && saved.is_none() {
        bail!(
            "No checkpoint to resume at {}",
            checkpoints.path().display()
        );
    }

    // Validate the work list before touching any saved progress
    let locations: Vec<Location> = match (&saved, locations_file) {
        (Some(_), _) => Vec::new(),
        (None, Some(path)) => load_locations(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!(HarvestError::NoLocations),
    };
    if saved.is_none() && locations.is_empty() {
        bail!(HarvestError::NoLocations);
    }

    if dry_run {
        let work = saved.as_ref().map_or(locations.as_slice(), |s| s.pending());
        return handle_dry_run(config, work);
    }

    if fresh {
        tracing::info!("Starting fresh scrape (discarding previous progress)");
        checkpoints
            .clear()
            .context("Failed to clear previous checkpoint")?;
    }

    if let Some(state) = &saved {
        tracing::info!(
            "Resuming: {} locations pending, {} already completed",
            state.pending().len(),
            state.completed().len()
        );
    }

    let outcome = run_scrape(config, &locations)
        .await
        .context("Scrape failed")?;
    print_run_summary(&outcome);
    Ok(())
}

/// Handles `scrape --dry-run`: shows the settings and work list
fn handle_dry_run(config: &Config, locations: &[Location]) -> anyhow::Result<()> {
    println!("=== Listing-Harvest Dry Run ===\n");

    println!("Search:");
    println!("  Category: {}", config.search.category);
    println!("  Endpoint: {}", config.search.base_url);

    println!("\nBrowser:");
    println!("  WebDriver: {}", config.driver.webdriver_url);
    println!("  Browser: {} (headless: {})", config.driver.browser, config.driver.headless);
    println!("  Wait timeout: {}s", config.driver.wait_timeout_secs);
    match config.driver.page_limit() {
        Some(limit) => println!("  Page limit: {}", limit),
        None => println!("  Page limit: none"),
    }

    println!("\nPacing between locations:");
    println!(
        "  {}-{}ms",
        config.pacing.location.min_ms, config.pacing.location.max_ms
    );

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_dir);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    println!("\nLocations ({}):", locations.len());
    for location in locations {
        println!("  - {}", location);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would scrape {} locations", locations.len());
    Ok(())
}

/// Handles `convert`: one result file or all of them
fn handle_convert(config: &Config, file: Option<&Path>) -> anyhow::Result<()> {
    match file {
        Some(artifact) => {
            let csv_path = csv_path_for(artifact);
            let rows = convert_result_file(artifact, &csv_path)
                .with_context(|| format!("Failed to convert {}", artifact.display()))?;
            println!(
                "✓ Converted {} listings to {}",
                rows,
                csv_path.display()
            );
        }
        None => {
            let store = ResultStore::from_config(&config.output);
            let report = convert_all(&store).context("Conversion failed")?;
            print_conversion_summary(&report);
        }
    }
    Ok(())
}

/// Handles `merge`: builds the consolidated dataset
fn handle_merge(config: &Config) -> anyhow::Result<()> {
    let store = ResultStore::from_config(&config.output);
    let output = Path::new(&config.output.consolidated_path);
    let report = merge_results(&store, output).context("Merge failed")?;
    print_merge_summary(&report);
    Ok(())
}
