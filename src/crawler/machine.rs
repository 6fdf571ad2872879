//! Page Crawl State Machine
//!
//! Walks one location's local results:
//!
//! ```text
//! Searching -> ListingPageLoaded -> ProcessingListing* -> Paginating -> ListingPageLoaded ...
//!                      |                                      |
//!                      +------------> Terminal <--------------+
//! ```
//!
//! The session, settings and pacer are threaded through every transition
//! explicitly; the machine itself holds no state besides `CrawlState` and the
//! records collected so far.

use crate::config::{Config, SelectorConfig};
use crate::crawler::listing::{dismiss_detail, process_listing, FieldStrategies};
use crate::crawler::pacing::Pacer;
use crate::driver::{DriverError, DriverResult, ElementHandle, PageSession};
use crate::locations::Location;
use crate::state::{CrawlState, TerminalReason};
use crate::storage::ListingRecord;
use std::time::Duration;
use url::Url;

/// Everything a crawl needs besides the session and pacer
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub search_base: Url,
    pub category: String,
    pub wait_timeout: Duration,
    pub max_pages: Option<u32>,
    pub selectors: SelectorConfig,
    pub fields: FieldStrategies,
}

impl CrawlSettings {
    /// Derives crawl settings from a validated configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            search_base: Url::parse(&config.search.base_url)?,
            category: config.search.category.clone(),
            wait_timeout: config.driver.wait_timeout(),
            max_pages: config.driver.page_limit(),
            selectors: config.selectors.clone(),
            fields: FieldStrategies::from_selectors(&config.selectors),
        })
    }

    /// Search URL for `location`
    pub fn search_url(&self, location: &Location) -> Url {
        search_url(&self.search_base, &self.category, location)
    }
}

/// Builds `<base>?tbm=lcl&q=<category> in <location>`
pub fn search_url(base: &Url, category: &str, location: &Location) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("tbm", "lcl")
        .append_pair("q", &format!("{} in {}", category, location.name()));
    url
}

/// Picks the pagination control to follow from the current page
///
/// Prefers the control labelled exactly `current + 1`. Otherwise falls back
/// to the highest numbered control above `current` (the last one on ties),
/// which may skip pages when the control set is sparse.
///
/// # Returns
///
/// Index into `labels` of the control to click, if any.
pub fn choose_next_page<L: AsRef<str>>(labels: &[L], current: u32) -> Option<usize> {
    let next = current.saturating_add(1).to_string();
    if let Some(index) = labels.iter().position(|l| l.as_ref().trim() == next) {
        return Some(index);
    }

    labels
        .iter()
        .enumerate()
        .filter_map(|(index, label)| {
            let number = label.as_ref().trim().parse::<u32>().ok()?;
            (number > current).then_some((index, number))
        })
        .max_by_key(|&(_, number)| number)
        .map(|(index, _)| index)
}

/// What one location's crawl produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub records: Vec<ListingRecord>,
    pub reason: TerminalReason,
    /// Results pages visited
    pub pages: u32,
    /// Listings that could not be opened
    pub skipped: usize,
}

/// Mutable context threaded through the transitions of one crawl
struct CrawlContext<'a, S: ?Sized> {
    session: &'a mut S,
    settings: &'a CrawlSettings,
    pacer: &'a mut Pacer,
    location: &'a Location,
    records: Vec<ListingRecord>,
    pages: u32,
    skipped: usize,
}

/// Crawls every results page for one location
///
/// Listing-level problems are logged and skipped, and a missing listings
/// container or pagination control ends the crawl normally. A later results
/// page that cannot be read also ends it, keeping the records collected so
/// far. Only failed navigation and errors reading the first page abort the
/// crawl and are returned.
///
/// # Arguments
///
/// * `session` - Page session, used exclusively by this crawl
/// * `settings` - Search, selector and timeout settings
/// * `pacer` - Source of the randomized pauses
/// * `location` - Location to search in
pub async fn crawl_location<S: PageSession + ?Sized>(
    session: &mut S,
    settings: &CrawlSettings,
    pacer: &mut Pacer,
    location: &Location,
) -> DriverResult<CrawlReport> {
    let mut ctx = CrawlContext {
        session,
        settings,
        pacer,
        location,
        records: Vec::new(),
        pages: 0,
        skipped: 0,
    };

    let mut state = CrawlState::Searching;
    let reason = loop {
        tracing::trace!(state = state.name(), "{}: {}", location, state);
        if let CrawlState::Terminal(reason) = state {
            break reason;
        }
        state = step(state, &mut ctx).await?;
    };

    tracing::info!(
        "Finished {}: {} listings over {} page(s), {}",
        location,
        ctx.records.len(),
        ctx.pages,
        reason
    );

    Ok(CrawlReport {
        records: ctx.records,
        reason,
        pages: ctx.pages,
        skipped: ctx.skipped,
    })
}

/// Performs one transition
async fn step<S: PageSession + ?Sized>(
    state: CrawlState,
    ctx: &mut CrawlContext<'_, S>,
) -> DriverResult<CrawlState> {
    match state {
        CrawlState::Searching => {
            let url = ctx.settings.search_url(ctx.location);
            tracing::info!("Searching {}", url);
            ctx.session.navigate(url.as_str()).await?;
            ctx.pacer.settle().await;
            Ok(CrawlState::ListingPageLoaded { page: 1 })
        }

        CrawlState::ListingPageLoaded { page } => load_listings(page, ctx).await,

        CrawlState::ProcessingListing {
            page,
            listings,
            index,
        } => {
            let Some(listing) = listings.get(index) else {
                return Ok(CrawlState::Paginating { page });
            };
            tracing::debug!(
                "Processing listing {}/{} on page {}",
                index + 1,
                listings.len(),
                page
            );
            handle_listing(listing, page, ctx).await;
            Ok(CrawlState::ProcessingListing {
                page,
                listings,
                index: index + 1,
            })
        }

        CrawlState::Paginating { page } => Ok(paginate(page, ctx).await),

        terminal @ CrawlState::Terminal(_) => Ok(terminal),
    }
}

async fn load_listings<S: PageSession + ?Sized>(
    page: u32,
    ctx: &mut CrawlContext<'_, S>,
) -> DriverResult<CrawlState> {
    let selectors = &ctx.settings.selectors;
    let container = match ctx
        .session
        .wait_until_present(&selectors.listings_container, ctx.settings.wait_timeout)
        .await
    {
        Ok(container) => container,
        Err(e) if e.is_absence() => {
            tracing::warn!(
                "No listings container for {} on page {}: {}",
                ctx.location,
                page,
                e
            );
            return Ok(CrawlState::Terminal(TerminalReason::ContainerTimeout {
                page,
            }));
        }
        Err(e) => return page_unreadable(page, e, ctx),
    };

    let listings = match ctx
        .session
        .find_all(&selectors.listing, Some(&container))
        .await
    {
        Ok(listings) => listings,
        Err(e) => return page_unreadable(page, e, ctx),
    };
    ctx.pages = page;
    tracing::info!("Found {} listings on page {}", listings.len(), page);

    Ok(CrawlState::ProcessingListing {
        page,
        listings,
        index: 0,
    })
}

/// Past the first page, an unreadable page ends the crawl with what was collected
fn page_unreadable<S: ?Sized>(
    page: u32,
    error: DriverError,
    ctx: &CrawlContext<'_, S>,
) -> DriverResult<CrawlState> {
    if page <= 1 {
        return Err(error);
    }
    tracing::warn!(
        "Could not read page {} for {}, keeping {} listings: {}",
        page,
        ctx.location,
        ctx.records.len(),
        error
    );
    Ok(CrawlState::Terminal(TerminalReason::PageUnreadable { page }))
}

async fn handle_listing<S: PageSession + ?Sized>(
    listing: &ElementHandle,
    page: u32,
    ctx: &mut CrawlContext<'_, S>,
) {
    let result = process_listing(
        &mut *ctx.session,
        listing,
        &ctx.settings.fields,
        ctx.settings.wait_timeout,
        &mut *ctx.pacer,
    )
    .await;

    match result {
        Ok(record) => ctx.records.push(record),
        Err(e) => {
            ctx.skipped += 1;
            tracing::warn!(
                "Skipping listing {} on page {} for {}: {}",
                listing,
                page,
                ctx.location,
                e
            );
        }
    }

    dismiss_detail(
        &mut *ctx.session,
        &ctx.settings.selectors.detail_close,
        &mut *ctx.pacer,
    )
    .await;
}

async fn paginate<S: PageSession + ?Sized>(page: u32, ctx: &mut CrawlContext<'_, S>) -> CrawlState {
    if let Some(limit) = ctx.settings.max_pages {
        if page >= limit {
            return CrawlState::Terminal(TerminalReason::PageLimit { pages: page });
        }
    }

    let control = match next_page_control(page, ctx).await {
        Ok(Some(control)) => control,
        Ok(None) => {
            tracing::info!("No more pages or results found");
            return CrawlState::Terminal(TerminalReason::NoMorePages { pages: page });
        }
        Err(e) => {
            tracing::warn!("Error with pagination on page {}: {}", page, e);
            return CrawlState::Terminal(TerminalReason::NoMorePages { pages: page });
        }
    };

    if let Err(e) = ctx.session.click(&control).await {
        tracing::warn!("Could not move past page {}: {}", page, e);
        return CrawlState::Terminal(TerminalReason::NoMorePages { pages: page });
    }

    tracing::info!("Moving to page {}", page + 1);
    ctx.pacer.page_turn().await;
    CrawlState::ListingPageLoaded { page: page + 1 }
}

/// Finds a numbered control past `page`, else a "more results" control
async fn next_page_control<S: PageSession + ?Sized>(
    page: u32,
    ctx: &mut CrawlContext<'_, S>,
) -> DriverResult<Option<ElementHandle>> {
    let selectors = &ctx.settings.selectors;
    let links = ctx.session.find_all(&selectors.pagination_link, None).await?;

    let mut labels = Vec::with_capacity(links.len());
    for link in &links {
        labels.push(ctx.session.text(link).await?);
    }

    if let Some(index) = choose_next_page(&labels, page) {
        return Ok(Some(links[index].clone()));
    }

    let more = ctx.session.find(&selectors.more_results, None).await?;
    if more.is_some() {
        tracing::debug!("Using 'more results' control after page {}", page);
    }
    Ok(more)
}
