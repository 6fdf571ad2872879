//! Locations and batches
//!
//! A location is a human-readable place name, optionally tagged "major".
//! Identity is the exact name: the major flag only steers strategic batching
//! and is never persisted in checkpoints or result artifacts.

mod files;
mod partition;

pub use files::{load_locations, save_all_locations, save_batches, ALL_LOCATIONS_FILE};
pub use partition::{partition, partition_sequential, partition_strategic};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker that tags a location as major in location list files
pub const MAJOR_MARKER: char = '*';

/// A place to search in
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Location {
    name: String,
    major: bool,
}

impl Location {
    /// Creates a regular (non-major) location
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            major: false,
        }
    }

    /// Creates a location tagged as major
    pub fn major(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            major: true,
        }
    }

    /// Parses a line from a location list file
    ///
    /// A `*` anywhere in the line marks the location as major; every marker is
    /// stripped and surrounding whitespace trimmed. Returns `None` for lines
    /// that are blank once markers are removed.
    pub fn parse_marked(line: &str) -> Option<Self> {
        let major = line.contains(MAJOR_MARKER);
        let name = line.replace(MAJOR_MARKER, "");
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            major,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_major(&self) -> bool {
        self.major
    }

    /// File-name fragment: lower-cased, spaces as `_`, path separators as `-`
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| match c {
                ' ' => '_',
                '/' | '\\' => '-',
                other => other,
            })
            .collect()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl From<String> for Location {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Location {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.name
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An ordered group of locations meant to be scraped in one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    locations: Vec<Location>,
}

impl Batch {
    pub(crate) fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.locations.iter().map(Location::name).collect()
    }

    pub fn major_count(&self) -> usize {
        self.locations.iter().filter(|l| l.is_major()).count()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marked() {
        let york = Location::parse_marked("  York ").unwrap();
        assert_eq!(york.name(), "York");
        assert!(!york.is_major());

        let london = Location::parse_marked("London*").unwrap();
        assert_eq!(london.name(), "London");
        assert!(london.is_major());

        let leeds = Location::parse_marked("* Leeds").unwrap();
        assert_eq!(leeds.name(), "Leeds");
        assert!(leeds.is_major());

        assert!(Location::parse_marked("   ").is_none());
        assert!(Location::parse_marked("*").is_none());
    }

    #[test]
    fn test_identity_ignores_major_flag() {
        assert_eq!(Location::major("Bath"), Location::new("Bath"));
        assert_ne!(Location::new("Bath"), Location::new("bath"));
    }

    #[test]
    fn test_slug() {
        assert_eq!(Location::new("Milton Keynes").slug(), "milton_keynes");
        assert_eq!(Location::new("Brighton & Hove").slug(), "brighton_&_hove");
        assert_eq!(Location::new("A/B").slug(), "a-b");
    }

    #[test]
    fn test_serializes_as_plain_name() {
        let json = serde_json::to_string(&Location::major("Stoke on Trent")).unwrap();
        assert_eq!(json, "\"Stoke on Trent\"");

        let parsed: Location = serde_json::from_str("\"Wells\"").unwrap();
        assert_eq!(parsed.name(), "Wells");
        assert!(!parsed.is_major());
    }
}
