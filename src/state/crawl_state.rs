/// Crawl state definitions for one location's result set
///
/// This module defines every state the page crawl state machine can be in
/// while walking a location's paginated local results.
use crate::driver::ElementHandle;
use std::fmt;

/// Represents the current state of one location's crawl
///
/// Page numbers are 1-based and count every listing page visited, whether it
/// was reached through a numbered control or a "more results" control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    // ===== Active States =====
    /// The search query is being issued
    Searching,

    /// A results page is loaded and its listings container is awaited
    ListingPageLoaded { page: u32 },

    /// Listings of the current page are being opened one by one
    ProcessingListing {
        page: u32,
        listings: Vec<ElementHandle>,
        index: usize,
    },

    /// Looking for the control leading past the current page
    Paginating { page: u32 },

    // ===== Terminal State =====
    /// No further work for this location
    Terminal(TerminalReason),
}

/// Why a location's crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalReason {
    /// No pagination control led past the last page
    NoMorePages { pages: u32 },

    /// The listings container never showed up on this page
    ContainerTimeout { page: u32 },

    /// The configured page limit was reached
    PageLimit { pages: u32 },

    /// A results page after the first could not be read
    PageUnreadable { page: u32 },
}

impl CrawlState {
    /// Short label used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::Searching => "searching",
            Self::ListingPageLoaded { .. } => "listing_page_loaded",
            Self::ProcessingListing { .. } => "processing_listing",
            Self::Paginating { .. } => "paginating",
            Self::Terminal(_) => "terminal",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Searching => write!(f, "searching"),
            Self::ListingPageLoaded { page } => write!(f, "page {} loaded", page),
            Self::ProcessingListing {
                page,
                listings,
                index,
            } => write!(
                f,
                "page {} listing {}/{}",
                page,
                index + 1,
                listings.len()
            ),
            Self::Paginating { page } => write!(f, "paginating from page {}", page),
            Self::Terminal(reason) => write!(f, "terminal ({})", reason),
        }
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMorePages { pages } => write!(f, "no more pages after {}", pages),
            Self::ContainerTimeout { page } => {
                write!(f, "listings container timed out on page {}", page)
            }
            Self::PageLimit { pages } => write!(f, "page limit of {} reached", pages),
            Self::PageUnreadable { page } => write!(f, "page {} could not be read", page),
        }
    }
}
