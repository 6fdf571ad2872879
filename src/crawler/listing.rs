//! Listing field strategies and per-listing processing

use crate::config::SelectorConfig;
use crate::crawler::extractor::{extract_field, Strategy};
use crate::crawler::pacing::Pacer;
use crate::driver::{DriverResult, ElementHandle, PageSession};
use crate::storage::ListingRecord;
use std::time::Duration;

/// Prefix of click-to-call link targets
pub const TEL_PREFIX: &str = "tel:";

/// Fallback chains for every listing field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStrategies {
    pub name: Vec<Strategy>,
    pub website: Vec<Strategy>,
    pub phone: Vec<Strategy>,
    pub address: Vec<Strategy>,
}

impl FieldStrategies {
    /// Builds the chains from configured selectors
    ///
    /// - phone: the data attribute of the phone element (looked up once),
    ///   then a click-to-call link with its `tel:` prefix removed
    /// - address: value inside the primary block, then inside the secondary
    ///   block, then the labeled address field
    pub fn from_selectors(selectors: &SelectorConfig) -> Self {
        Self {
            name: vec![Strategy::text(&selectors.name)],
            website: vec![Strategy::attribute(&selectors.website, "href")],
            phone: vec![
                Strategy::attribute(&selectors.phone_data, &selectors.phone_attribute).immediate(),
                Strategy::attribute(&selectors.phone_link, "href").strip_prefix(TEL_PREFIX),
            ],
            address: vec![
                Strategy::text(&selectors.address_value).within(&selectors.address_primary),
                Strategy::text(&selectors.address_value).within(&selectors.address_secondary),
                Strategy::text(&selectors.address_labeled),
            ],
        }
    }
}

/// Opens one listing and reads its fields
///
/// Only a failure to open the listing is an error; fields that cannot be
/// read are simply absent from the record. Dismissing the detail view is
/// left to the caller.
///
/// # Arguments
///
/// * `session` - Page showing the listing
/// * `listing` - Listing element to click
/// * `fields` - Fallback chain per field
/// * `timeout` - Bound for each waiting lookup
/// * `pacer` - Source of the post-click delay
pub async fn process_listing<S: PageSession + ?Sized>(
    session: &mut S,
    listing: &ElementHandle,
    fields: &FieldStrategies,
    timeout: Duration,
    pacer: &mut Pacer,
) -> DriverResult<ListingRecord> {
    session.click(listing).await?;
    pacer.after_click().await;

    let record = ListingRecord {
        name: extract_field(session, "name", &fields.name, timeout)
            .await
            .into_value(),
        website: extract_field(session, "website", &fields.website, timeout)
            .await
            .into_value(),
        phone: extract_field(session, "phone", &fields.phone, timeout)
            .await
            .into_value(),
        address: extract_field(session, "address", &fields.address, timeout)
            .await
            .into_value(),
    };

    if record.is_empty() {
        tracing::warn!("Listing {} opened but no field could be read", listing);
    } else {
        tracing::info!(
            "Found details for: {}",
            record.name.as_deref().unwrap_or("<unnamed>")
        );
    }
    Ok(record)
}

/// Closes an open detail view, best-effort
///
/// Returns true if a close control was found and clicked.
pub async fn dismiss_detail<S: PageSession + ?Sized>(
    session: &mut S,
    close_selector: &str,
    pacer: &mut Pacer,
) -> bool {
    let control = match session.find(close_selector, None).await {
        Ok(Some(control)) => control,
        Ok(None) => {
            tracing::debug!("No close control found, continuing");
            return false;
        }
        Err(e) => {
            tracing::debug!("Could not look up close control: {}", e);
            return false;
        }
    };

    match session.click(&control).await {
        Ok(()) => {
            pacer.after_dismiss().await;
            true
        }
        Err(e) => {
            tracing::debug!("Could not close detail view: {}", e);
            false
        }
    }
}
