//! This module provides the main entry point for freeze-thaw lookups.
//! It ties the season data folder, the nearest-station search and the historical
//! aggregation together behind one client.

use crate::error::FreezeThawError;
use crate::history::aggregate::{aggregate, AggregateOutcome, AggregateResult, SeasonCoverage};
use crate::seasons::store::SeasonStore;
use crate::seasons::SeasonSource;
use crate::stations::locate_station::{
    locate_nearest, locate_within_radius, ResolvedStation, DEFAULT_MAX_DISTANCE_KM,
    DEFAULT_NEARBY_RADIUS_KM,
};
use crate::types::station::{LatLon, StationRecord};
use crate::utils::{ensure_data_dir_exists, get_default_data_dir};
use bon::bon;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The result of [`FreezeThaw::analyze`].
///
/// Each variant past [`Analysis::NoSeasons`] corresponds to one step of the lookup getting
/// further: the state was known, a station was close enough, the station had history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Analysis {
    /// The data source has no seasons at all.
    NoSeasons,
    /// No station in the latest season belongs to the requested state.
    UnknownState { available_states: Vec<String> },
    /// The state has stations, but none within the search radius. `candidates` lists all of
    /// them so the caller can offer a manual choice.
    NoStationWithinRadius { candidates: Vec<StationRecord> },
    /// A station was found but none of the seasons had a matching row.
    NoHistory {
        station: ResolvedStation,
        coverage: SeasonCoverage,
    },
    Complete {
        station: ResolvedStation,
        result: AggregateResult,
        seasons_available: usize,
    },
}

impl Analysis {
    pub fn station(&self) -> Option<&ResolvedStation> {
        match self {
            Analysis::NoHistory { station, .. } | Analysis::Complete { station, .. } => {
                Some(station)
            }
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AggregateResult> {
        match self {
            Analysis::Complete { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// The main client for freeze-thaw lookups.
///
/// Create an instance using [`FreezeThaw::new()`] to read season files from the working
/// directory, [`FreezeThaw::with_data_folder()`] for a specific folder, or
/// [`FreezeThaw::with_source()`] for data that is already in memory.
///
/// # Examples
///
/// ```rust
/// # use freeze_thaw::{Analysis, FreezeThaw, LatLon, SeasonDataset, StationRecord};
/// let boulder = StationRecord {
///     state: "Colorado".into(),
///     county_raw: "Boulder1".into(),
///     latitude: Some(40.015),
///     longitude: Some(-105.2705),
///     total_cycles: 61.0,
///     damaging_cycles: 12.0,
/// };
/// let client = FreezeThaw::with_source(vec![SeasonDataset::new("2022-2023", vec![boulder])]);
///
/// let analysis = client
///     .analyze()
///     .location(LatLon(40.0, -105.25))
///     .state("colorado")
///     .call();
/// assert!(matches!(analysis, Analysis::Complete { .. }));
/// ```
pub struct FreezeThaw {
    source: Box<dyn SeasonSource>,
}

#[bon]
impl FreezeThaw {
    /// Creates a client reading season files from `data_folder`.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeThawError::DataDirNotFound`] if the folder does not exist and
    /// [`FreezeThawError::DataDirNotADirectory`] if the path is a file.
    pub fn with_data_folder(data_folder: PathBuf) -> Result<Self, FreezeThawError> {
        ensure_data_dir_exists(&data_folder)?;
        info!("Reading season data from {:?}", data_folder);
        Ok(Self::with_source(SeasonStore::new(data_folder)))
    }

    /// Creates a client reading season files from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeThawError::DataDirResolution`] if the working directory cannot be
    /// determined.
    pub fn new() -> Result<Self, FreezeThawError> {
        let data_folder = get_default_data_dir()?;
        Self::with_data_folder(data_folder)
    }

    pub fn with_source(source: impl SeasonSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// All season ids the data source knows about, sorted ascending.
    pub fn seasons(&self) -> Vec<String> {
        self.source.available_seasons()
    }

    /// States present in the latest season, sorted.
    pub fn states(&self) -> Vec<String> {
        match self.source.available_seasons().last() {
            Some(latest) => self.source.load_season(latest).states(),
            None => Vec::new(),
        }
    }

    /// Finds the station nearest to `location` within `state` and summarizes its history
    /// over every available season.
    ///
    /// Stations are taken from the latest season. The state filter is a case-insensitive
    /// substring match.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to search around.
    /// * `.state(&str)`: **Required.** The state to pick stations from.
    /// * `.max_distance_km(f64)`: Optional. The search radius. Defaults to `50.0`.
    #[builder]
    pub fn analyze(
        &self,
        location: LatLon,
        state: &str,
        max_distance_km: Option<f64>,
    ) -> Analysis {
        let max_distance_km = max_distance_km.unwrap_or(DEFAULT_MAX_DISTANCE_KM);

        let seasons = self.source.available_seasons();
        let Some(latest_id) = seasons.last() else {
            debug!("No seasons available");
            return Analysis::NoSeasons;
        };
        let latest = self.source.load_season(latest_id);

        let candidates = latest.filter_state(state);
        if candidates.is_empty() {
            debug!("No stations for state '{}' in season {}", state, latest_id);
            return Analysis::UnknownState {
                available_states: latest.states(),
            };
        }

        let Some(station) = locate_nearest(location.0, location.1, &candidates, max_distance_km)
        else {
            return Analysis::NoStationWithinRadius { candidates };
        };

        let outcome = aggregate(&station, &seasons, |id| {
            if id == latest_id {
                latest.clone()
            } else {
                self.source.load_season(id)
            }
        });

        match outcome {
            AggregateOutcome::NoData(coverage) => Analysis::NoHistory { station, coverage },
            AggregateOutcome::Summary(result) => {
                info!(
                    "Summarized {} of {} seasons for {}, {}",
                    result.records.len(),
                    seasons.len(),
                    station.county_clean(),
                    station.state()
                );
                Analysis::Complete {
                    station,
                    result,
                    seasons_available: seasons.len(),
                }
            }
        }
    }

    /// Lists stations of the latest season within a radius of `location`, closest first.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to search around.
    /// * `.state(&str)`: Optional. Restricts the search to one state.
    /// * `.radius_km(f64)`: Optional. The search radius. Defaults to `25.0`.
    #[builder]
    pub fn nearby(
        &self,
        location: LatLon,
        state: Option<&str>,
        radius_km: Option<f64>,
    ) -> Vec<(StationRecord, f64)> {
        let radius_km = radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);

        let Some(latest_id) = self.source.available_seasons().pop() else {
            return Vec::new();
        };
        let latest = self.source.load_season(&latest_id);

        let candidates = match state {
            Some(state) => latest.filter_state(state),
            None => latest.records,
        };
        locate_within_radius(location.0, location.1, &candidates, radius_km)
    }
}
