//! Access to the season datasets the analysis runs over.

pub mod error;
pub mod reader;
pub mod store;

use crate::types::season::SeasonDataset;
use store::SeasonStore;

/// Where season data comes from.
///
/// Implementations absorb their own failures: a season that cannot be loaded comes back
/// as an empty dataset.
pub trait SeasonSource {
    /// Season identifiers, sorted ascending.
    fn available_seasons(&self) -> Vec<String>;

    fn load_season(&self, season_id: &str) -> SeasonDataset;
}

impl SeasonSource for SeasonStore {
    fn available_seasons(&self) -> Vec<String> {
        SeasonStore::available_seasons(self)
    }

    fn load_season(&self, season_id: &str) -> SeasonDataset {
        SeasonStore::load_season(self, season_id)
    }
}

/// In-memory seasons, for callers that already hold their data.
impl SeasonSource for Vec<SeasonDataset> {
    fn available_seasons(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.iter().map(|s| s.season_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    fn load_season(&self, season_id: &str) -> SeasonDataset {
        self.iter()
            .find(|s| s.season_id == season_id)
            .cloned()
            .unwrap_or_else(|| SeasonDataset::empty(season_id))
    }
}
