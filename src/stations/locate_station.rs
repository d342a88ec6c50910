use crate::types::station::{LatLon, StationRecord};
use haversine::{distance, Location as HaversineLocation, Units};
use log::{debug, info};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default search radius for [`locate_nearest`], in kilometers.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
/// Default search radius for [`locate_within_radius`], in kilometers.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 25.0;

/// The station chosen as nearest to a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStation {
    pub station: StationRecord,
    /// The station's validated position.
    pub location: LatLon,
    /// Great-circle distance from the query point.
    pub distance_km: f64,
}

impl ResolvedStation {
    pub fn state(&self) -> &str {
        &self.station.state
    }

    pub fn county_clean(&self) -> &str {
        self.station.county_clean()
    }
}

/// Great-circle distance between two points in kilometers (haversine, R = 6371 km).
pub fn haversine_km(from: LatLon, to: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: from.0,
            longitude: from.1,
        },
        HaversineLocation {
            latitude: to.0,
            longitude: to.1,
        },
        Units::Kilometers,
    )
}

fn is_finite_point(point: LatLon) -> bool {
    point.0.is_finite() && point.1.is_finite()
}

// Helper struct for ordering candidates by distance
struct StationCandidate<'a> {
    distance_km: OrderedFloat<f64>,
    location: LatLon,
    station: &'a StationRecord,
}
// Manual implementations (only compare distance)
impl PartialEq for StationCandidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.distance_km == other.distance_km
    }
}
impl Eq for StationCandidate<'_> {}
impl PartialOrd for StationCandidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for StationCandidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_km.cmp(&other.distance_km)
    }
}

/// Distance search over a fixed set of candidate stations.
///
/// Candidates without a usable position are dropped when the locator is built;
/// [`StationLocator::skipped`] reports how many.
#[derive(Debug, Clone)]
pub struct StationLocator<'a> {
    stations: Vec<(LatLon, &'a StationRecord)>,
    skipped: usize,
}

impl<'a> StationLocator<'a> {
    pub fn new(candidates: &'a [StationRecord]) -> Self {
        let stations: Vec<_> = candidates
            .iter()
            .filter_map(|station| station.location().map(|loc| (loc, station)))
            .collect();
        let skipped = candidates.len() - stations.len();
        if skipped > 0 {
            debug!(
                "Skipped {} of {} candidate stations without valid coordinates",
                skipped,
                candidates.len()
            );
        }
        Self { stations, skipped }
    }

    /// Number of candidates ignored because their coordinates were missing or not finite.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of candidates with usable coordinates.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    fn candidates(&self, query: LatLon) -> impl Iterator<Item = StationCandidate<'a>> + '_ {
        self.stations.iter().map(move |&(location, station)| StationCandidate {
            distance_km: OrderedFloat(haversine_km(query, location)),
            location,
            station,
        })
    }

    /// Finds the single nearest station, or `None` if there are no candidates or the
    /// nearest one is farther than `max_distance_km`.
    ///
    /// A query point or radius that is not a finite number finds nothing.
    pub fn nearest(&self, query: LatLon, max_distance_km: f64) -> Option<ResolvedStation> {
        if !is_finite_point(query) {
            debug!("Query point {:?} is not a valid coordinate", query);
            return None;
        }
        let Some(best) = self.candidates(query).min() else {
            debug!("No candidate stations with valid coordinates");
            return None;
        };

        let distance_km = best.distance_km.into_inner();
        // Also false when the radius is NaN
        let in_range = distance_km <= max_distance_km;
        if !in_range {
            debug!(
                "Nearest station is {:.2} km away, which exceeds maximum distance of {} km",
                distance_km, max_distance_km
            );
            return None;
        }

        info!(
            "Found nearest station: {}, {} at {:.2} km",
            best.station.county_clean(),
            best.station.state,
            distance_km
        );
        Some(ResolvedStation {
            station: best.station.clone(),
            location: best.location,
            distance_km,
        })
    }

    /// All stations within `radius_km` of the query, closest first.
    pub fn within_radius(&self, query: LatLon, radius_km: f64) -> Vec<(StationRecord, f64)> {
        if !is_finite_point(query) {
            debug!("Query point {:?} is not a valid coordinate", query);
            return Vec::new();
        }
        let mut in_range: Vec<StationCandidate<'_>> = self
            .candidates(query)
            .filter(|c| c.distance_km.into_inner() <= radius_km)
            .collect();
        in_range.sort();

        debug!("Found {} stations within {} km", in_range.len(), radius_km);
        in_range
            .into_iter()
            .map(|c| (c.station.clone(), c.distance_km.into_inner()))
            .collect()
    }
}

/// Returns the station nearest to `(query_lat, query_lon)`, or `None` if no candidate
/// lies within `max_distance_km`.
///
/// Candidates with missing or non-finite coordinates are skipped.
///
/// # Examples
///
/// ```
/// use freeze_thaw::{locate_nearest, StationRecord};
///
/// let denver = StationRecord {
///     state: "CO".into(),
///     county_raw: "Denver".into(),
///     latitude: Some(39.74),
///     longitude: Some(-104.99),
///     total_cycles: 80.0,
///     damaging_cycles: 20.0,
/// };
/// let found = locate_nearest(39.7392, -104.9903, &[denver], 50.0).unwrap();
/// assert!(found.distance_km < 0.1);
/// ```
pub fn locate_nearest(
    query_lat: f64,
    query_lon: f64,
    candidates: &[StationRecord],
    max_distance_km: f64,
) -> Option<ResolvedStation> {
    StationLocator::new(candidates).nearest(LatLon(query_lat, query_lon), max_distance_km)
}

/// Returns every candidate within `radius_km` of `(query_lat, query_lon)` together with
/// its distance, sorted by ascending distance.
pub fn locate_within_radius(
    query_lat: f64,
    query_lon: f64,
    candidates: &[StationRecord],
    radius_km: f64,
) -> Vec<(StationRecord, f64)> {
    StationLocator::new(candidates).within_radius(LatLon(query_lat, query_lon), radius_km)
}
