//! Crawler module for browsing local results
//!
//! This module contains the core scraping logic, including:
//! - The extraction fallback chain for unreliable page fields
//! - Listing field strategies and per-listing processing
//! - The per-location page crawl state machine
//! - Randomized pacing between browser actions
//! - Overall run coordination with checkpointing

mod coordinator;
mod extractor;
mod listing;
mod machine;
mod pacing;

pub use coordinator::{run_scrape, Coordinator, RunOutcome};
pub use extractor::{extract_field, Extraction, ReadMode, Strategy, StrategyOutcome};
pub use listing::{dismiss_detail, process_listing, FieldStrategies, TEL_PREFIX};
pub use machine::{choose_next_page, crawl_location, search_url, CrawlReport, CrawlSettings};
pub use pacing::Pacer;
