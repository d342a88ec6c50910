use crate::history::statistics::{SummaryStats, Trend, TrendComparison};
use crate::stations::locate_station::ResolvedStation;
use crate::stations::matcher::{CountyMatcher, StationMatcher};
use crate::types::season::{SeasonDataset, SeasonStatistic};
use log::debug;
use serde::{Deserialize, Serialize};

/// Number of most recent seasons summarized in [`AggregateResult::recent`].
pub const RECENT_SEASON_WINDOW: usize = 5;

/// Which requested seasons did not contribute a record, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCoverage {
    /// Number of season ids that were requested.
    pub requested: usize,
    /// Seasons whose dataset was empty or could not be loaded.
    pub empty: Vec<String>,
    /// Seasons that loaded but had no row for the station.
    pub unmatched: Vec<String>,
}

impl SeasonCoverage {
    pub fn matched(&self) -> usize {
        self.requested - self.empty.len() - self.unmatched.len()
    }
}

/// Cycle history and summary statistics for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Matched seasons, most recent first.
    pub records: Vec<SeasonStatistic>,
    /// Statistics over every matched season.
    pub all_time: SummaryStats,
    /// Statistics over the most recent (up to five) matched seasons.
    pub recent: SummaryStats,
    pub coverage: SeasonCoverage,
}

impl AggregateResult {
    fn from_records(mut records: Vec<SeasonStatistic>, coverage: SeasonCoverage) -> Self {
        // Plain string order stands in for chronological order
        records.sort_by(|a, b| b.season_id.cmp(&a.season_id));
        let all_time = SummaryStats::from_records(&records);
        let recent =
            SummaryStats::from_records(&records[..records.len().min(RECENT_SEASON_WINDOW)]);
        Self {
            records,
            all_time,
            recent,
            coverage,
        }
    }

    /// The seasons [`AggregateResult::recent`] was computed from.
    pub fn recent_records(&self) -> &[SeasonStatistic] {
        &self.records[..self.recent.n_seasons]
    }

    /// Compares recent averages against the all-time averages.
    pub fn trend(&self) -> TrendComparison {
        TrendComparison {
            total: Trend::compare(self.recent.total_avg, self.all_time.total_avg),
            damaging: Trend::compare(self.recent.damaging_avg, self.all_time.damaging_avg),
        }
    }
}

/// Outcome of [`aggregate`]: either a summary or the coverage showing why nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggregateOutcome {
    Summary(AggregateResult),
    NoData(SeasonCoverage),
}

impl AggregateOutcome {
    pub fn summary(&self) -> Option<&AggregateResult> {
        match self {
            AggregateOutcome::Summary(result) => Some(result),
            AggregateOutcome::NoData(_) => None,
        }
    }

    pub fn into_summary(self) -> Option<AggregateResult> {
        match self {
            AggregateOutcome::Summary(result) => Some(result),
            AggregateOutcome::NoData(_) => None,
        }
    }

    pub fn coverage(&self) -> &SeasonCoverage {
        match self {
            AggregateOutcome::Summary(result) => &result.coverage,
            AggregateOutcome::NoData(coverage) => coverage,
        }
    }
}

/// Collects the resolved station's cycle counts from every season and summarizes them.
///
/// `season_accessor` is called once per season id. Seasons that come back empty, or that
/// have no row for the station, are skipped and listed in [`SeasonCoverage`].
///
/// # Examples
///
/// ```
/// use freeze_thaw::{aggregate, locate_nearest, SeasonDataset, StationRecord};
///
/// let row = |total: f64| StationRecord {
///     state: "CO".into(),
///     county_raw: "Boulder1".into(),
///     latitude: Some(40.015),
///     longitude: Some(-105.27),
///     total_cycles: total,
///     damaging_cycles: total / 2.0,
/// };
/// let seasons = vec!["2021-2022".to_string(), "2022-2023".to_string()];
/// let latest = vec![row(60.0)];
///
/// let station = locate_nearest(40.0, -105.3, &latest, 50.0).unwrap();
/// let outcome = aggregate(&station, &seasons, |id| match id {
///     "2021-2022" => SeasonDataset::new(id, vec![row(40.0)]),
///     _ => SeasonDataset::new(id, latest.clone()),
/// });
/// let result = outcome.summary().unwrap();
/// assert_eq!(result.records[0].season_id, "2022-2023");
/// assert_eq!(result.all_time.total_avg, 50.0);
/// ```
pub fn aggregate<F>(
    resolved: &ResolvedStation,
    season_ids: &[String],
    season_accessor: F,
) -> AggregateOutcome
where
    F: FnMut(&str) -> SeasonDataset,
{
    aggregate_with(&CountyMatcher, resolved, season_ids, season_accessor)
}

/// Like [`aggregate`], with a custom [`StationMatcher`].
pub fn aggregate_with<M, F>(
    matcher: &M,
    resolved: &ResolvedStation,
    season_ids: &[String],
    mut season_accessor: F,
) -> AggregateOutcome
where
    M: StationMatcher + ?Sized,
    F: FnMut(&str) -> SeasonDataset,
{
    let mut coverage = SeasonCoverage {
        requested: season_ids.len(),
        ..SeasonCoverage::default()
    };
    let mut records = Vec::new();

    for season_id in season_ids {
        let season = season_accessor(season_id);
        if season.is_empty() {
            debug!("Season {} has no data, skipping", season_id);
            coverage.empty.push(season_id.clone());
            continue;
        }

        match matcher.find_match(&resolved.station, &season) {
            Some(row) => records.push(SeasonStatistic {
                season_id: season_id.clone(),
                total_cycles: row.total_cycles,
                damaging_cycles: row.damaging_cycles,
            }),
            None => {
                debug!(
                    "No row for {}, {} in season {}",
                    resolved.county_clean(),
                    resolved.state(),
                    season_id
                );
                coverage.unmatched.push(season_id.clone());
            }
        }
    }

    if records.is_empty() {
        debug!(
            "Station {}, {} matched in none of {} seasons",
            resolved.county_clean(),
            resolved.state(),
            coverage.requested
        );
        return AggregateOutcome::NoData(coverage);
    }

    AggregateOutcome::Summary(AggregateResult::from_records(records, coverage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::station::{LatLon, StationRecord};
    use std::collections::HashMap;

    fn row(county: &str, lat: f64, lon: f64, total: f64, damaging: f64) -> StationRecord {
        StationRecord {
            state: "CO".to_string(),
            county_raw: county.to_string(),
            latitude: Some(lat),
            longitude: Some(lon),
            total_cycles: total,
            damaging_cycles: damaging,
        }
    }

    fn resolved(county: &str, lat: f64, lon: f64) -> ResolvedStation {
        ResolvedStation {
            station: row(county, lat, lon, 0.0, 0.0),
            location: LatLon(lat, lon),
            distance_km: 0.0,
        }
    }

    fn season_ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}-{}", 2000 + i, 2001 + i)).collect()
    }

    /// One Boulder row per season with totals 10, 20, 30, ... from oldest to newest.
    fn boulder_history(ids: &[String]) -> HashMap<String, SeasonDataset> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let total = 10.0 * (i as f64 + 1.0);
                let records = vec![
                    row(&format!("Boulder{}", i), 40.015, -105.27, total, total / 5.0),
                    row("Denver", 39.74, -104.99, 99.0, 9.0),
                ];
                (id.clone(), SeasonDataset::new(id.clone(), records))
            })
            .collect()
    }

    fn accessor(
        seasons: &HashMap<String, SeasonDataset>,
    ) -> impl FnMut(&str) -> SeasonDataset + '_ {
        move |id: &str| {
            seasons
                .get(id)
                .cloned()
                .unwrap_or_else(|| SeasonDataset::empty(id))
        }
    }

    #[test]
    fn test_five_seasons_recent_equals_all_time() {
        let ids = season_ids(5);
        let seasons = boulder_history(&ids);
        let outcome = aggregate(&resolved("Boulder3", 40.015, -105.27), &ids, accessor(&seasons));
        let result = outcome.summary().unwrap();

        let totals: Vec<f64> = result.records.iter().map(|r| r.total_cycles).collect();
        assert_eq!(totals, vec![50.0, 40.0, 30.0, 20.0, 10.0]);
        assert_eq!(result.all_time.total_avg, 30.0);
        assert_eq!(result.recent.total_avg, result.all_time.total_avg);
        assert_eq!(result.recent.n_seasons, 5);
        assert_eq!(result.trend().total, Trend::Stable);
    }

    #[test]
    fn test_recent_window_takes_latest_five() {
        let ids = season_ids(8);
        let seasons = boulder_history(&ids);
        let result = aggregate(&resolved("Boulder", 40.015, -105.27), &ids, accessor(&seasons))
            .into_summary()
            .unwrap();

        assert_eq!(result.all_time.n_seasons, 8);
        assert_eq!(result.recent.n_seasons, 5);
        assert_eq!(result.records[0].season_id, "2007-2008");
        let recent_ids: Vec<_> = result
            .recent_records()
            .iter()
            .map(|r| r.season_id.as_str())
            .collect();
        assert_eq!(
            recent_ids,
            vec!["2007-2008", "2006-2007", "2005-2006", "2004-2005", "2003-2004"]
        );
        // 80, 70, 60, 50, 40
        assert_eq!(result.recent.total_avg, 60.0);
        assert_eq!(result.all_time.total_avg, 45.0);
        assert_eq!(result.trend().total, Trend::Increasing);
        assert_eq!(result.trend().damaging, Trend::Increasing);
    }

    #[test]
    fn test_recent_subset_bound() {
        for n in 1..=9 {
            let ids = season_ids(n);
            let seasons = boulder_history(&ids);
            let result = aggregate(&resolved("Boulder", 40.015, -105.27), &ids, accessor(&seasons))
                .into_summary()
                .unwrap();
            assert_eq!(result.recent_records().len(), n.min(RECENT_SEASON_WINDOW));
            assert!(result.recent.n_seasons <= result.all_time.n_seasons.min(5));
        }
    }

    #[test]
    fn test_missing_and_unmatched_seasons_are_skipped() {
        let ids = season_ids(4);
        let mut seasons = boulder_history(&ids);
        seasons.remove(&ids[1]);
        seasons.insert(
            ids[2].clone(),
            SeasonDataset::new(ids[2].clone(), vec![row("Denver", 39.74, -104.99, 1.0, 1.0)]),
        );

        let outcome = aggregate(&resolved("Boulder", 40.015, -105.27), &ids, accessor(&seasons));
        let result = outcome.summary().unwrap();
        assert_eq!(result.all_time.n_seasons, 2);
        assert_eq!(result.coverage.requested, 4);
        assert_eq!(result.coverage.empty, vec![ids[1].clone()]);
        assert_eq!(result.coverage.unmatched, vec![ids[2].clone()]);
        assert_eq!(result.coverage.matched(), 2);
    }

    #[test]
    fn test_no_data_when_nothing_matches() {
        let ids = season_ids(3);
        let seasons = boulder_history(&ids);
        let outcome = aggregate(&resolved("Mesa", 39.06, -108.55), &ids, accessor(&seasons));
        assert!(outcome.summary().is_none());
        assert_eq!(outcome.coverage().unmatched.len(), 3);

        let outcome = aggregate(&resolved("Mesa", 39.06, -108.55), &[], accessor(&seasons));
        assert_eq!(outcome, AggregateOutcome::NoData(SeasonCoverage::default()));
    }

    #[test]
    fn test_duplicate_county_picks_closest_row() {
        let ids = vec!["2019-2020".to_string()];
        let mut seasons = HashMap::new();
        seasons.insert(
            ids[0].clone(),
            SeasonDataset::new(
                ids[0].clone(),
                vec![
                    row("Jefferson1", 40.0, -105.0, 11.0, 1.0),
                    row("Jefferson2", 40.5, -105.5, 22.0, 2.0),
                ],
            ),
        );
        let result = aggregate(&resolved("Jefferson", 40.01, -105.01), &ids, accessor(&seasons))
            .into_summary()
            .unwrap();
        assert_eq!(result.records[0].total_cycles, 11.0);
    }

    #[test]
    fn test_accessor_called_once_per_season() {
        let ids = season_ids(6);
        let seasons = boulder_history(&ids);
        let mut calls = Vec::new();
        aggregate(&resolved("Boulder", 40.015, -105.27), &ids, |id| {
            calls.push(id.to_string());
            seasons.get(id).cloned().unwrap_or_default()
        });
        assert_eq!(calls, ids);
    }

    #[test]
    fn test_custom_matcher() {
        struct FirstRow;
        impl StationMatcher for FirstRow {
            fn find_match<'s>(
                &self,
                _target: &StationRecord,
                season: &'s SeasonDataset,
            ) -> Option<&'s StationRecord> {
                season.records.first()
            }
        }

        let ids = season_ids(2);
        let seasons = boulder_history(&ids);
        let result = aggregate_with(
            &FirstRow,
            &resolved("Nowhere", 0.0, 0.0),
            &ids,
            accessor(&seasons),
        )
        .into_summary()
        .unwrap();
        assert_eq!(result.all_time.n_seasons, 2);
    }

    #[test]
    fn test_result_serializes() {
        let ids = season_ids(2);
        let seasons = boulder_history(&ids);
        let result = aggregate(&resolved("Boulder", 40.015, -105.27), &ids, accessor(&seasons))
            .into_summary()
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["records"][0]["season_id"], "2001-2002");
        assert_eq!(json["all_time"]["n_seasons"], 2);
        assert_eq!(json["recent"]["total_avg"], 15.0);
    }
}
