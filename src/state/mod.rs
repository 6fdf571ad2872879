//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: Where one location's crawl currently is (searching, on a page, on a listing, paginating, done)
//! - `ProgressState`: Which locations of a run are pending and which are completed

mod crawl_state;
mod progress;

// Re-export main types
pub use crawl_state::{CrawlState, TerminalReason};
pub use progress::{local_now, ProgressState};
