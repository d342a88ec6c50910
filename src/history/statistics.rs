//! Descriptive statistics over per-season cycle counts.
//!
//! All figures use population statistics (divide by `n`, not `n - 1`).

use crate::types::season::SeasonStatistic;
use crate::types::variability::{classify, Variability};
use serde::{Deserialize, Serialize};

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, `0.0` for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation in percent (`stddev / mean * 100`).
///
/// Defined as `0.0` when there are fewer than two samples or the mean is not positive.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if values.len() < 2 || !(m > 0.0) {
        return 0.0;
    }
    population_std_dev(values) / m * 100.0
}

/// Averages and variability of total and damaging cycles over a set of seasons.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_avg: f64,
    pub damaging_avg: f64,
    pub total_cov: f64,
    pub damaging_cov: f64,
    pub n_seasons: usize,
}

impl SummaryStats {
    pub fn from_records(records: &[SeasonStatistic]) -> Self {
        let totals: Vec<f64> = records.iter().map(|r| r.total_cycles).collect();
        let damaging: Vec<f64> = records.iter().map(|r| r.damaging_cycles).collect();
        Self {
            total_avg: mean(&totals),
            damaging_avg: mean(&damaging),
            total_cov: coefficient_of_variation(&totals),
            damaging_cov: coefficient_of_variation(&damaging),
            n_seasons: records.len(),
        }
    }

    pub fn total_variability(&self) -> Variability {
        classify(self.total_cov)
    }

    pub fn damaging_variability(&self) -> Variability {
        classify(self.damaging_cov)
    }
}

/// Direction of the recent average relative to the long-term one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn compare(recent_avg: f64, all_time_avg: f64) -> Self {
        if recent_avg > all_time_avg {
            Trend::Increasing
        } else if recent_avg < all_time_avg {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

/// Recent-vs-all-time comparison for both cycle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendComparison {
    pub total: Trend,
    pub damaging: Trend,
}
