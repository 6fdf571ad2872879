//! Collected data
//!
//! These types are written to result artifacts as-is, so their field names
//! are part of the on-disk format.

use crate::locations::Location;
use crate::state::local_now;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One business listing
///
/// Every field is optional: a field that could not be extracted is `None`
/// and serialized as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ListingRecord {
    /// Returns true if no field was extracted
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.website.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

/// Everything collected for one location in one crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResult {
    pub location: Location,
    pub scrape_date: NaiveDateTime,
    pub total_restaurants: usize,
    pub restaurants: Vec<ListingRecord>,
}

impl LocationResult {
    /// Wraps the records of a finished crawl, stamped with the current time
    pub fn new(location: Location, records: Vec<ListingRecord>) -> Self {
        Self {
            location,
            scrape_date: local_now(),
            total_restaurants: records.len(),
            restaurants: records,
        }
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.restaurants
    }
}
