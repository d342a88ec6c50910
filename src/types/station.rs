//! Defines the row type of a freeze-thaw season dataset, the county name cleaning
//! used to re-identify stations across seasons, and the coordinate pair used for queries.

use serde::{Deserialize, Serialize};

// --- Data Structures ---

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are WGS84 decimal degrees.
///
/// # Examples
///
/// ```
/// use freeze_thaw::LatLon;
///
/// let denver = LatLon(39.7392, -104.9903);
/// assert_eq!(denver.0, 39.7392); // Latitude
/// assert_eq!(denver.1, -104.9903); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

/// One monitoring station's row within a single season's dataset.
///
/// Station identity is not stable across seasons: the same physical station may appear
/// with a different disambiguating suffix on its county name (`"Jefferson5"` in one season,
/// `"Jefferson2"` in another). Use [`StationRecord::county_clean`] to compare counties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    /// The state the station is located in, as written in the source data.
    pub state: String,
    /// The county name as written in the source data, possibly with a numeric suffix.
    pub county_raw: String,
    /// Latitude in decimal degrees, `None` if the source cell was missing or unparseable.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, `None` if the source cell was missing or unparseable.
    pub longitude: Option<f64>,
    /// Number of freeze-thaw cycles recorded during the season.
    pub total_cycles: f64,
    /// Number of damaging freeze-thaw cycles recorded during the season.
    pub damaging_cycles: f64,
}

impl StationRecord {
    /// The county name with any trailing numeric disambiguator removed.
    ///
    /// See [`clean_county_name`].
    pub fn county_clean(&self) -> &str {
        clean_county_name(&self.county_raw)
    }

    /// The station's position, if both coordinates are present and finite.
    pub fn location(&self) -> Option<LatLon> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(LatLon(lat, lon)),
            _ => None,
        }
    }
}

/// Strips the trailing run of digits (and the whitespace around it) from a county name.
///
/// If nothing would be left, the original value is returned unchanged, so a county that
/// is only a number keeps its number. The function is idempotent.
///
/// # Examples
///
/// ```
/// use freeze_thaw::clean_county_name;
///
/// assert_eq!(clean_county_name("Jefferson5"), "Jefferson");
/// assert_eq!(clean_county_name("Jefferson"), "Jefferson");
/// assert_eq!(clean_county_name("5"), "5");
/// ```
pub fn clean_county_name(raw: &str) -> &str {
    let cleaned = raw
        .trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace())
        .trim();
    if cleaned.is_empty() {
        raw
    } else {
        cleaned
    }
}
