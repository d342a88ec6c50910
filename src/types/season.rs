//! Season-level containers: the rows of one season and the per-season figures
//! extracted for a single station.

use crate::types::station::StationRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All station rows reported for one season (e.g. `"2023-2024"`).
///
/// Season identifiers are opaque strings. They are compared as plain strings, which
/// matches chronological order only while the years are written with the same number
/// of digits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonDataset {
    /// The season identifier this dataset was loaded for.
    pub season_id: String,
    /// Rows of the season, in source order.
    pub records: Vec<StationRecord>,
}

impl SeasonDataset {
    pub fn new(season_id: impl Into<String>, records: Vec<StationRecord>) -> Self {
        Self {
            season_id: season_id.into(),
            records,
        }
    }

    /// An empty dataset, used when a season could not be loaded.
    pub fn empty(season_id: impl Into<String>) -> Self {
        Self::new(season_id, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Sorted, de-duplicated, trimmed state names present in this season.
    pub fn states(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.state.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows whose state contains `state` (case-insensitive, surrounding whitespace ignored).
    ///
    /// An empty query matches nothing.
    pub fn filter_state(&self, state: &str) -> Vec<StationRecord> {
        let needle = state.trim().to_uppercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|r| r.state.to_uppercase().contains(&needle))
            .cloned()
            .collect()
    }
}

/// One season's cycle counts for the station being analysed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonStatistic {
    pub season_id: String,
    pub total_cycles: f64,
    pub damaging_cycles: f64,
}
