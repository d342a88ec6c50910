//! Turns a season file into [`StationRecord`]s.
//!
//! Expected columns: `State`, `County`, `Latitude`, `Longitude`,
//! `Total_Freeze_Thaw_Cycles`, `Damaging_Freeze_Thaw_Cycles` and optionally `Season`.

use crate::seasons::error::SeasonDataError;
use crate::types::station::StationRecord;
use log::debug;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

const COL_STATE: &str = "State";
const COL_COUNTY: &str = "County";
const COL_LATITUDE: &str = "Latitude";
const COL_LONGITUDE: &str = "Longitude";
const COL_TOTAL: &str = "Total_Freeze_Thaw_Cycles";
const COL_DAMAGING: &str = "Damaging_Freeze_Thaw_Cycles";
const COL_SEASON: &str = "Season";

/// File formats a season can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonFileFormat {
    Csv,
    Parquet,
}

impl SeasonFileFormat {
    pub const ALL: [SeasonFileFormat; 2] = [SeasonFileFormat::Csv, SeasonFileFormat::Parquet];

    pub fn extension(&self) -> &'static str {
        match self {
            SeasonFileFormat::Csv => "csv",
            SeasonFileFormat::Parquet => "parquet",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| ext.eq_ignore_ascii_case(format.extension()))
    }
}

/// A parsed row plus the season label it carried, if the file had a `Season` column.
#[derive(Debug, Clone)]
pub(crate) struct SeasonRow {
    pub season: Option<String>,
    pub record: StationRecord,
}

fn read_frame(path: &Path) -> Result<DataFrame, SeasonDataError> {
    match SeasonFileFormat::from_path(path) {
        Some(SeasonFileFormat::Csv) => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| SeasonDataError::CsvRead(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| SeasonDataError::CsvRead(path.to_path_buf(), e)),
        Some(SeasonFileFormat::Parquet) => {
            let file =
                File::open(path).map_err(|e| SeasonDataError::FileRead(path.to_path_buf(), e))?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| SeasonDataError::ParquetRead(path.to_path_buf(), e))
        }
        None => Err(SeasonDataError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Retrieves a required column by name.
fn get_column<'a>(
    df: &'a DataFrame,
    path: &Path,
    name: &str,
) -> Result<&'a Column, SeasonDataError> {
    df.column(name).map_err(|_| SeasonDataError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })
}

fn cast_error(path: &Path, name: &str) -> impl FnOnce(PolarsError) -> SeasonDataError {
    let path = path.to_path_buf();
    let column = name.to_string();
    move |source| SeasonDataError::ColumnCast {
        path,
        column,
        source,
    }
}

/// Reads a column as floats. Text cells that do not parse as a number become `None`.
fn float_values(
    column: &Column,
    path: &Path,
    name: &str,
) -> Result<Vec<Option<f64>>, SeasonDataError> {
    if column.dtype() == &DataType::String {
        let values = column.str().map_err(cast_error(path, name))?;
        return Ok(values
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect());
    }
    let cast = column
        .cast(&DataType::Float64)
        .map_err(cast_error(path, name))?;
    let values = cast.f64().map_err(cast_error(path, name))?;
    Ok(values.into_iter().collect())
}

fn string_values(
    column: &Column,
    path: &Path,
    name: &str,
) -> Result<Vec<Option<String>>, SeasonDataError> {
    let cast = column
        .cast(&DataType::String)
        .map_err(cast_error(path, name))?;
    let values = cast.str().map_err(cast_error(path, name))?;
    Ok(values
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Reads every usable row of a season file.
///
/// Rows without a state, county or cycle counts are dropped. Missing or unparseable
/// coordinates are kept as `None` so the locator can skip them.
pub(crate) fn read_season_file(path: &Path) -> Result<Vec<SeasonRow>, SeasonDataError> {
    let df = read_frame(path)?;

    let states = string_values(get_column(&df, path, COL_STATE)?, path, COL_STATE)?;
    let counties = string_values(get_column(&df, path, COL_COUNTY)?, path, COL_COUNTY)?;
    let latitudes = float_values(get_column(&df, path, COL_LATITUDE)?, path, COL_LATITUDE)?;
    let longitudes = float_values(get_column(&df, path, COL_LONGITUDE)?, path, COL_LONGITUDE)?;
    let totals = float_values(get_column(&df, path, COL_TOTAL)?, path, COL_TOTAL)?;
    let damaging = float_values(get_column(&df, path, COL_DAMAGING)?, path, COL_DAMAGING)?;
    let seasons = match df.column(COL_SEASON) {
        Ok(column) => string_values(column, path, COL_SEASON)?,
        Err(_) => vec![None; df.height()],
    };

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(state), Some(county), Some(total), Some(damaging)) = (
            states[i].as_deref(),
            counties[i].as_deref(),
            totals[i],
            damaging[i],
        ) else {
            continue;
        };
        rows.push(SeasonRow {
            season: seasons[i]
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            record: StationRecord {
                state: state.to_string(),
                county_raw: county.to_string(),
                latitude: latitudes[i],
                longitude: longitudes[i],
                total_cycles: total,
                damaging_cycles: damaging,
            },
        });
    }

    let skipped = df.height() - rows.len();
    if skipped > 0 {
        debug!(
            "Dropped {} of {} rows without state, county or cycle counts from {:?}",
            skipped,
            df.height(),
            path
        );
    }
    Ok(rows)
}
