use crate::seasons::error::SeasonDataError;
use crate::seasons::reader::{read_season_file, SeasonFileFormat, SeasonRow};
use crate::types::season::SeasonDataset;
use crate::types::station::StationRecord;
use log::{info, warn};
use std::collections::{hash_map::Entry, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Optional file name prefix in front of the season identifier (`FT_2023-2024.csv`).
const SEASON_FILE_PREFIX: &str = "FT_";

/// Season files in a single folder, one file per season or combined files with a
/// `Season` column.
///
/// Parsed seasons and the season list are memoized; call [`SeasonStore::clear_cache`] after
/// the files change.
pub struct SeasonStore {
    data_dir: PathBuf,
    season_cache: Mutex<HashMap<String, SeasonDataset>>,
    season_list: Mutex<Option<Vec<String>>>,
}

impl SeasonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            season_cache: Mutex::new(HashMap::new()),
            season_list: Mutex::new(None),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, SeasonDataset>> {
        // The map is never left half-written, so a poisoned lock is still usable
        self.season_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn list_cache(&self) -> MutexGuard<'_, Option<Vec<String>>> {
        self.season_list
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
        *self.list_cache() = None;
    }

    /// The season a file holds according to its name (`FT_2001-2002.csv` → `2001-2002`).
    fn season_from_file_name(path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        let season = stem.strip_prefix(SEASON_FILE_PREFIX).unwrap_or(stem);
        Some(season.to_string())
    }

    /// Season files in the data folder, sorted by path.
    fn season_files(&self) -> Result<Vec<PathBuf>, SeasonDataError> {
        let entries = std::fs::read_dir(&self.data_dir)
            .map_err(|e| SeasonDataError::DataDirRead(self.data_dir.clone(), e))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && SeasonFileFormat::from_path(path).is_some())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Parses every season file. Files that fail to parse are logged and left out.
    fn load_all_rows(&self) -> Result<Vec<(PathBuf, Vec<SeasonRow>)>, SeasonDataError> {
        let mut loaded = Vec::new();
        for path in self.season_files()? {
            match read_season_file(&path) {
                Ok(rows) => {
                    info!("Loaded {} records from {:?}", rows.len(), path);
                    loaded.push((path, rows));
                }
                Err(e) => warn!("Skipping season file {:?}: {}", path, e),
            }
        }
        Ok(loaded)
    }

    /// Sorted, de-duplicated season identifiers found in the data folder.
    ///
    /// A row belongs to the season in its `Season` column, or to the season named by its
    /// file when that cell is absent. Unreadable files are logged and left out. The list
    /// is computed once and kept until [`SeasonStore::clear_cache`].
    pub fn available_seasons(&self) -> Vec<String> {
        if let Some(seasons) = self.list_cache().as_ref() {
            return seasons.clone();
        }

        let files = match self.season_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list season files: {}", e);
                return Vec::new();
            }
        };

        let mut seasons = BTreeSet::new();
        for path in &files {
            let file_season = Self::season_from_file_name(path);
            match read_season_file(path) {
                Ok(rows) => seasons.extend(
                    rows.into_iter()
                        .filter_map(|row| row.season.or_else(|| file_season.clone())),
                ),
                Err(e) => warn!("Could not read seasons from {:?}: {}", path, e),
            }
        }
        seasons.retain(|s: &String| !s.is_empty());

        let seasons: Vec<String> = seasons.into_iter().collect();
        *self.list_cache() = Some(seasons.clone());
        seasons
    }

    /// Loads one season, or an empty dataset if it cannot be loaded.
    pub fn load_season(&self, season_id: &str) -> SeasonDataset {
        match self.try_load_season(season_id) {
            Ok(season) => season,
            Err(e) => {
                warn!("Error loading season {}: {}", season_id, e);
                SeasonDataset::empty(season_id)
            }
        }
    }

    /// Loads one season.
    ///
    /// A dedicated file (`{id}.csv`, `{id}.parquet`, `FT_{id}.csv`, `FT_{id}.parquet`) is
    /// used if present. Otherwise every file is read and rows belonging to the season are
    /// kept.
    pub fn try_load_season(&self, season_id: &str) -> Result<SeasonDataset, SeasonDataError> {
        if let Some(cached) = self.cache().get(season_id) {
            return Ok(cached.clone());
        }

        let season = self.read_season(season_id)?;

        Ok(match self.cache().entry(season_id.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(season).clone(),
        })
    }

    fn read_season(&self, season_id: &str) -> Result<SeasonDataset, SeasonDataError> {
        if let Some(path) = self.dedicated_file(season_id) {
            let records = Self::rows_of_season(read_season_file(&path)?, &path, season_id);
            if !records.is_empty() {
                info!(
                    "Loaded season {} from {:?}: {} records",
                    season_id,
                    path,
                    records.len()
                );
                return Ok(SeasonDataset::new(season_id, records));
            }
        }

        let mut records = Vec::new();
        for (path, rows) in self.load_all_rows()? {
            records.extend(Self::rows_of_season(rows, &path, season_id));
        }

        if records.is_empty() {
            return Err(SeasonDataError::SeasonNotFound(season_id.to_string()));
        }
        info!(
            "Extracted season {} from combined data: {} records",
            season_id,
            records.len()
        );
        Ok(SeasonDataset::new(season_id, records))
    }

    /// Rows of `path` that belong to `season_id`, by `Season` cell or else by file name.
    fn rows_of_season(
        rows: Vec<SeasonRow>,
        path: &Path,
        season_id: &str,
    ) -> Vec<StationRecord> {
        let file_season = Self::season_from_file_name(path);
        rows.into_iter()
            .filter(|row| row.season.as_deref().or(file_season.as_deref()) == Some(season_id))
            .map(|row| row.record)
            .collect()
    }

    fn dedicated_file(&self, season_id: &str) -> Option<PathBuf> {
        ["", SEASON_FILE_PREFIX]
            .into_iter()
            .flat_map(|prefix| {
                SeasonFileFormat::ALL
                    .into_iter()
                    .map(move |format| format!("{}{}.{}", prefix, season_id, format.extension()))
            })
            .map(|name| self.data_dir.join(name))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::fs::File;
    use tempfile::{tempdir, TempDir};

    const HEADER: &str =
        "State,County,Latitude,Longitude,Total_Freeze_Thaw_Cycles,Damaging_Freeze_Thaw_Cycles";

    fn write(dir: &TempDir, name: &str, body: &str) {
        std::fs::write(dir.path().join(name), body).unwrap();
    }

    fn season_csv(total: u32) -> String {
        format!(
            "{HEADER}\n\
             Colorado,Boulder1,40.015,-105.2705,{total},{}\n\
             Colorado,Denver,39.74,-104.99,80,20\n",
            total / 4
        )
    }

    #[test]
    fn test_available_seasons_from_file_names() {
        let dir = tempdir().unwrap();
        write(&dir, "2002-2003.csv", &season_csv(40));
        write(&dir, "FT_2001-2002.csv", &season_csv(30));
        write(&dir, "notes.txt", "ignored");
        std::fs::create_dir(dir.path().join("2009-2010.csv")).unwrap();

        let store = SeasonStore::new(dir.path());
        assert_eq!(store.available_seasons(), vec!["2001-2002", "2002-2003"]);
    }

    #[test]
    fn test_available_seasons_include_season_column() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "history.csv",
            &format!(
                "{HEADER},Season\n\
                 Colorado,Boulder1,40.015,-105.2705,61,12,1999-2000\n\
                 Colorado,Boulder1,40.015,-105.2705,48,8,2000-2001\n"
            ),
        );
        write(&dir, "2001-2002.csv", &season_csv(30));

        let store = SeasonStore::new(dir.path());
        assert_eq!(
            store.available_seasons(),
            vec!["1999-2000", "2000-2001", "2001-2002"]
        );
        assert!(store.load_season("history").is_empty());
    }

    #[test]
    fn test_blank_season_cell_falls_back_to_file_name() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "FT_2001-2002.csv",
            &format!(
                "{HEADER},Season\n\
                 Colorado,Boulder1,40.015,-105.2705,61,12,\n\
                 Colorado,Boulder1,40.015,-105.2705,48,8,2000-2001\n"
            ),
        );

        let store = SeasonStore::new(dir.path());
        assert_eq!(store.available_seasons(), vec!["2000-2001", "2001-2002"]);
        let season = store.load_season("2001-2002");
        assert_eq!(season.len(), 1);
        assert_eq!(season.records[0].total_cycles, 61.0);
        let season = store.load_season("2000-2001");
        assert_eq!(season.len(), 1);
        assert_eq!(season.records[0].total_cycles, 48.0);
    }

    #[test]
    fn test_season_list_is_cached_until_cleared() {
        let dir = tempdir().unwrap();
        write(&dir, "2001-2002.csv", &season_csv(30));

        let store = SeasonStore::new(dir.path());
        assert_eq!(store.available_seasons(), vec!["2001-2002"]);

        write(&dir, "2002-2003.csv", &season_csv(40));
        assert_eq!(store.available_seasons(), vec!["2001-2002"]);

        store.clear_cache();
        assert_eq!(store.available_seasons(), vec!["2001-2002", "2002-2003"]);
    }

    #[test]
    fn test_missing_directory_yields_no_seasons() {
        let store = SeasonStore::new("/definitely/not/a/real/folder");
        assert!(store.available_seasons().is_empty());
        assert!(store.load_season("2001-2002").is_empty());
    }

    #[test]
    fn test_load_dedicated_file_with_prefix() {
        let dir = tempdir().unwrap();
        write(&dir, "FT_2001-2002.csv", &season_csv(30));

        let store = SeasonStore::new(dir.path());
        let season = store.load_season("2001-2002");
        assert_eq!(season.season_id, "2001-2002");
        assert_eq!(season.len(), 2);
        assert_eq!(season.records[0].total_cycles, 30.0);
    }

    #[test]
    fn test_load_parquet_file() {
        let dir = tempdir().unwrap();
        let mut frame = df!(
            "State" => ["Colorado"],
            "County" => ["Boulder3"],
            "Latitude" => [40.015],
            "Longitude" => [-105.2705],
            "Total_Freeze_Thaw_Cycles" => [72.0],
            "Damaging_Freeze_Thaw_Cycles" => [18.0],
        )
        .unwrap();
        let file = File::create(dir.path().join("2003-2004.parquet")).unwrap();
        ParquetWriter::new(file).finish(&mut frame).unwrap();

        let store = SeasonStore::new(dir.path());
        assert_eq!(store.available_seasons(), vec!["2003-2004"]);
        let season = store.load_season("2003-2004");
        assert_eq!(season.records[0].county_clean(), "Boulder");
        assert_eq!(season.records[0].damaging_cycles, 18.0);
    }

    #[test]
    fn test_load_from_combined_file() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "history.csv",
            &format!(
                "{HEADER},Season\n\
                 Colorado,Boulder1,40.015,-105.2705,61,12,1999-2000\n\
                 Colorado,Denver,39.74,-104.99,70,15,1999-2000\n\
                 Colorado,Boulder1,40.015,-105.2705,48,8,2000-2001\n"
            ),
        );

        let store = SeasonStore::new(dir.path());
        let season = store.load_season("1999-2000");
        assert_eq!(season.len(), 2);
        let season = store.load_season("2000-2001");
        assert_eq!(season.len(), 1);
        assert_eq!(season.records[0].total_cycles, 48.0);
    }

    #[test]
    fn test_unknown_season_is_empty() {
        let dir = tempdir().unwrap();
        write(&dir, "2001-2002.csv", &season_csv(30));

        let store = SeasonStore::new(dir.path());
        assert!(store.load_season("1850-1851").is_empty());
        assert!(matches!(
            store.try_load_season("1850-1851"),
            Err(SeasonDataError::SeasonNotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_absorbed() {
        let dir = tempdir().unwrap();
        write(&dir, "2001-2002.csv", "State,County\nColorado,Boulder\n");

        let store = SeasonStore::new(dir.path());
        assert!(store.load_season("2001-2002").is_empty());
        assert!(matches!(
            store.try_load_season("2001-2002"),
            Err(SeasonDataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_seasons_are_cached_until_cleared() {
        let dir = tempdir().unwrap();
        write(&dir, "2001-2002.csv", &season_csv(30));

        let store = SeasonStore::new(dir.path());
        assert_eq!(store.load_season("2001-2002").records[0].total_cycles, 30.0);

        write(&dir, "2001-2002.csv", &season_csv(90));
        assert_eq!(store.load_season("2001-2002").records[0].total_cycles, 30.0);

        store.clear_cache();
        assert_eq!(store.load_season("2001-2002").records[0].total_cycles, 90.0);
    }
}
