//! Re-identification of a station inside another season's dataset.
//!
//! Season files carry no stable station key, so a station is found again by its state
//! and cleaned county name. When that still leaves several rows, the one closest to the
//! original coordinates wins.

use crate::types::season::SeasonDataset;
use crate::types::station::{LatLon, StationRecord};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Strategy for finding `target`'s row in a season.
///
/// The aggregator only depends on this trait, so a fuzzier heuristic can replace
/// [`CountyMatcher`] without touching the statistics.
pub trait StationMatcher {
    fn find_match<'s>(
        &self,
        target: &StationRecord,
        season: &'s SeasonDataset,
    ) -> Option<&'s StationRecord>;
}

/// Matches on state and cleaned county name (trimmed, case-insensitive), breaking ties by
/// plane distance in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountyMatcher;

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

impl StationMatcher for CountyMatcher {
    fn find_match<'s>(
        &self,
        target: &StationRecord,
        season: &'s SeasonDataset,
    ) -> Option<&'s StationRecord> {
        let state = normalize(&target.state);
        let county = normalize(target.county_clean());

        let matches: Vec<&StationRecord> = season
            .records
            .iter()
            .filter(|r| normalize(&r.state) == state && normalize(r.county_clean()) == county)
            .collect();

        match matches.as_slice() {
            [] => None,
            [only] => Some(*only),
            [first, ..] => target
                .location()
                .and_then(|loc| closest_by_plane_distance(&matches, loc))
                .or(Some(*first)),
        }
    }
}

/// A record with a known position, indexable by `rstar`.
struct PositionedRecord<'s> {
    point: [f64; 2],
    record: &'s StationRecord,
}

impl RTreeObject for PositionedRecord<'_> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PositionedRecord<'_> {
    // Squared Euclidean distance in (latitude, longitude) degrees
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

fn closest_by_plane_distance<'s>(
    rows: &[&'s StationRecord],
    target: LatLon,
) -> Option<&'s StationRecord> {
    let positioned: Vec<PositionedRecord<'s>> = rows
        .iter()
        .filter_map(|&record| {
            record.location().map(|loc| PositionedRecord {
                point: [loc.0, loc.1],
                record,
            })
        })
        .collect();

    RTree::bulk_load(positioned)
        .nearest_neighbor_iter(&[target.0, target.1])
        .next()
        .map(|p| p.record)
}
