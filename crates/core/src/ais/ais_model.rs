//! AIS store domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one bulk load, or of a whole persistence cycle once merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Records in the staging payload(s)
    pub total_input: usize,
    /// Rows added to the append-only history
    pub new_history_rows: usize,
    /// Rows inserted or overwritten in the latest-state table
    pub new_latest_rows: usize,
    /// Whether history retention was on for this load
    pub history_enabled: bool,
}

impl LoadReport {
    /// Records that did not produce a history row (already stored, or
    /// retention off).
    pub fn discarded_history(&self) -> usize {
        self.total_input.saturating_sub(self.new_history_rows)
    }

    /// Records that did not change the latest state (older than the stored
    /// row, or superseded within the batch).
    pub fn discarded_latest(&self) -> usize {
        self.total_input.saturating_sub(self.new_latest_rows)
    }

    pub fn has_changes(&self) -> bool {
        self.new_history_rows > 0 || self.new_latest_rows > 0
    }

    /// Adds another load's counts to this one.
    pub fn absorb(&mut self, other: &LoadReport) {
        self.total_input += other.total_input;
        self.new_history_rows += other.new_history_rows;
        self.new_latest_rows += other.new_latest_rows;
        self.history_enabled |= other.history_enabled;
    }
}

/// Vessel outline dimensions derived from its latest static information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipGeometry {
    pub mmsi: i64,
    /// Bow plus stern distance, meters
    pub length: Option<i32>,
    /// Port plus starboard distance, meters
    pub width: Option<i32>,
    /// Ship type category, e.g. "cargo"
    pub category: Option<String>,
    /// Latest-state time this geometry was derived from
    pub last_update: DateTime<Utc>,
}
