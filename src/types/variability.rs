//! Presentation labels for coefficient-of-variation values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// COV values below this (in percent) are [`Variability::Low`].
pub const LOW_VARIABILITY_MAX: f64 = 15.0;
/// COV values up to and including this (in percent) are [`Variability::Moderate`].
pub const MODERATE_VARIABILITY_MAX: f64 = 40.0;

/// How much a station's cycle counts vary from season to season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variability {
    /// COV below 15%: a consistent pattern year over year.
    Low,
    /// COV between 15% and 40% inclusive.
    Moderate,
    /// COV above 40%: high year-to-year variation.
    High,
}

impl Variability {
    fn label(&self) -> &'static str {
        match self {
            Variability::Low => "Low",
            Variability::Moderate => "Moderate",
            Variability::High => "High",
        }
    }
}

/// Allows formatting a `Variability` variant using its label.
///
/// # Examples
///
/// ```
/// use freeze_thaw::Variability;
///
/// assert_eq!(Variability::Moderate.to_string(), "Moderate");
/// ```
impl fmt::Display for Variability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classifies a coefficient of variation (in percent).
///
/// # Examples
///
/// ```
/// use freeze_thaw::{classify, Variability};
///
/// assert_eq!(classify(10.0), Variability::Low);
/// assert_eq!(classify(15.0), Variability::Moderate);
/// assert_eq!(classify(40.0), Variability::Moderate);
/// assert_eq!(classify(40.1), Variability::High);
/// ```
pub fn classify(cov: f64) -> Variability {
    if cov < LOW_VARIABILITY_MAX {
        Variability::Low
    } else if cov <= MODERATE_VARIABILITY_MAX {
        Variability::Moderate
    } else {
        Variability::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.0), Variability::Low);
        assert_eq!(classify(14.999), Variability::Low);
        assert_eq!(classify(15.0), Variability::Moderate);
        assert_eq!(classify(27.5), Variability::Moderate);
        assert_eq!(classify(40.0), Variability::Moderate);
        assert_eq!(classify(40.0001), Variability::High);
        assert_eq!(classify(250.0), Variability::High);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Variability::Low), "Low");
        assert_eq!(Variability::High.to_string(), "High");
    }
}
