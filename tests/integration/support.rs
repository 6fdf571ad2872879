//! Shared fixtures

use listing_harvest::config::{parse_config, SelectorConfig};
use listing_harvest::crawler::{Coordinator, CrawlSettings, Pacer};
use listing_harvest::driver::{ClickAction, MemoryElement, MemorySession};
use listing_harvest::storage::{JsonCheckpointStore, ResultStore};
use std::path::{Path, PathBuf};

/// One listing on a scripted results page
pub enum Listing {
    /// Opens a detail view with this name and address
    Named(&'static str, &'static str),
    /// Clicking it fails
    Broken,
}

pub fn settings() -> CrawlSettings {
    let config = parse_config("[search]\ncategory = \"Caribbean restaurants\"\n").unwrap();
    CrawlSettings::from_config(&config).unwrap()
}

/// Adds a single results page for `location`, reached by its search URL
pub fn with_location(
    mut session: MemorySession,
    location: &str,
    listings: &[Listing],
) -> MemorySession {
    let s: SelectorConfig = settings().selectors;
    let key = location.to_lowercase().replace(' ', "-");

    let mut elements = Vec::new();
    for (index, listing) in listings.iter().enumerate() {
        let id = format!("{}-listing-{}", key, index + 1);
        match listing {
            Listing::Named(name, address) => {
                let detail = format!("{}-detail-{}", key, index + 1);
                session = session.with_detail(
                    detail.clone(),
                    vec![
                        MemoryElement::new(format!("{}-name", detail))
                            .matching(&s.name)
                            .text(*name),
                        MemoryElement::new(format!("{}-address", detail))
                            .matching(&s.address_labeled)
                            .text(*address),
                        MemoryElement::new(format!("{}-close", detail))
                            .matching(&s.detail_close)
                            .on_click(ClickAction::CloseDetail),
                    ],
                );
                elements.push(
                    MemoryElement::new(id)
                        .matching(&s.listing)
                        .on_click(ClickAction::OpenDetail(detail)),
                );
            }
            Listing::Broken => elements.push(
                MemoryElement::new(id)
                    .matching(&s.listing)
                    .on_click(ClickAction::Fail("element is not clickable".into())),
            ),
        }
    }

    let search_term = format!("in+{}", location.replace(' ', "+"));
    session
        .with_page(
            key.clone(),
            vec![MemoryElement::new(format!("{}-container", key))
                .matching(&s.listings_container)
                .children(elements)],
        )
        .route(search_term, key)
}

pub fn checkpoint_path(dir: &Path) -> PathBuf {
    dir.join("scraper_progress.json")
}

pub fn result_store(dir: &Path) -> ResultStore {
    ResultStore::new(dir.join("results"), "restaurants")
}

pub fn coordinator(
    session: MemorySession,
    dir: &Path,
) -> Coordinator<MemorySession, JsonCheckpointStore> {
    Coordinator::new(
        session,
        JsonCheckpointStore::new(checkpoint_path(dir)),
        result_store(dir),
        settings(),
        Pacer::disabled(),
    )
}
