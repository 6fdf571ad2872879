//! Run progress
//!
//! `ProgressState` is the content of the checkpoint: which locations are
//! still pending and which are done. It is persisted with the field names
//! `locations` (pending), `completed` and `timestamp`.

use crate::locations::Location;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Local wall-clock time truncated to microseconds
///
/// Used for checkpoint timestamps and result artifact dates.
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    let micros = now.nanosecond() / 1_000 * 1_000;
    now.with_nanosecond(micros).unwrap_or(now)
}

/// Pending and completed locations of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    #[serde(rename = "locations")]
    pending: Vec<Location>,
    #[serde(default)]
    completed: Vec<Location>,
    timestamp: NaiveDateTime,
}

impl ProgressState {
    /// Starts a run with every location pending
    ///
    /// Repeated locations are kept once, in first-seen order.
    pub fn new(locations: Vec<Location>) -> Self {
        Self::from_parts(locations, Vec::new())
    }

    /// Builds a state from a pending and a completed list
    ///
    /// Duplicates are dropped from both lists and anything already completed
    /// is removed from pending, so the two never overlap.
    pub fn from_parts(pending: Vec<Location>, completed: Vec<Location>) -> Self {
        let mut completed_unique: Vec<Location> = Vec::with_capacity(completed.len());
        for location in completed {
            if !completed_unique.contains(&location) {
                completed_unique.push(location);
            }
        }

        let mut pending_unique: Vec<Location> = Vec::with_capacity(pending.len());
        for location in pending {
            if !completed_unique.contains(&location) && !pending_unique.contains(&location) {
                pending_unique.push(location);
            }
        }

        Self {
            pending: pending_unique,
            completed: completed_unique,
            timestamp: local_now(),
        }
    }

    /// Re-applies the disjointness rules to a state read from disk
    pub fn normalized(self) -> Self {
        let timestamp = self.timestamp;
        Self {
            timestamp,
            ..Self::from_parts(self.pending, self.completed)
        }
    }

    pub fn pending(&self) -> &[Location] {
        &self.pending
    }

    pub fn completed(&self) -> &[Location] {
        &self.completed
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn is_completed(&self, location: &Location) -> bool {
        self.completed.contains(location)
    }

    pub fn is_pending(&self, location: &Location) -> bool {
        self.pending.contains(location)
    }

    /// Returns true when nothing is left to do
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    /// Moves `location` from pending to completed and refreshes the timestamp
    ///
    /// # Returns
    ///
    /// `false` if the location was not pending (nothing changes then).
    pub fn mark_completed(&mut self, location: &Location) -> bool {
        let Some(position) = self.pending.iter().position(|l| l == location) else {
            return false;
        };
        let location = self.pending.remove(position);
        self.completed.push(location);
        self.touch();
        true
    }

    /// Refreshes the timestamp without changing the partition
    pub fn touch(&mut self) {
        self.timestamp = local_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(locations: &[Location]) -> Vec<&str> {
        locations.iter().map(Location::name).collect()
    }

    #[test]
    fn test_new_deduplicates_pending() {
        let state = ProgressState::new(vec!["York".into(), "Bath".into(), "York".into()]);
        assert_eq!(names(state.pending()), vec!["York", "Bath"]);
        assert!(state.completed().is_empty());
        assert!(!state.is_finished());
    }

    #[test]
    fn test_mark_completed_keeps_partition() {
        let mut state = ProgressState::new(vec!["York".into(), "Bath".into()]);
        assert!(state.mark_completed(&"Bath".into()));
        assert_eq!(names(state.pending()), vec!["York"]);
        assert_eq!(names(state.completed()), vec!["Bath"]);

        assert!(!state.mark_completed(&"Bath".into()));
        assert!(!state.mark_completed(&"Leeds".into()));
        assert_eq!(state.completed().len(), 1);

        assert!(state.mark_completed(&"York".into()));
        assert!(state.is_finished());
        assert_eq!(names(state.completed()), vec!["Bath", "York"]);
    }

    #[test]
    fn test_from_parts_removes_overlap() {
        let state = ProgressState::from_parts(
            vec!["Leeds".into(), "York".into()],
            vec!["York".into(), "York".into()],
        );
        assert_eq!(names(state.pending()), vec!["Leeds"]);
        assert_eq!(names(state.completed()), vec!["York"]);
        assert!(state.is_pending(&"Leeds".into()));
        assert!(state.is_completed(&"York".into()));
    }

    #[test]
    fn test_serialized_layout() {
        let state = ProgressState::from_parts(vec!["Leeds".into()], vec!["York".into()]);
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["locations"], serde_json::json!(["Leeds"]));
        assert_eq!(value["completed"], serde_json::json!(["York"]));
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_reads_checkpoint_written_elsewhere() {
        let json = r#"{
            "locations": ["Leeds", "York"],
            "completed": ["York"],
            "timestamp": "2024-05-01T14:03:27.123456"
        }"#;
        let state: ProgressState = serde_json::from_str(json).unwrap();
        let state = state.normalized();

        assert_eq!(names(state.pending()), vec!["Leeds"]);
        assert_eq!(names(state.completed()), vec!["York"]);
        assert_eq!(
            state.timestamp().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-05-01 14:03:27"
        );
    }

    #[test]
    fn test_local_now_has_microsecond_precision() {
        assert_eq!(local_now().nanosecond() % 1_000, 0);
    }
}
