use crate::error::FreezeThawError;
use std::io;
use std::path::{Path, PathBuf};

pub fn get_default_data_dir() -> Result<PathBuf, FreezeThawError> {
    std::env::current_dir().map_err(FreezeThawError::DataDirResolution)
}

pub fn ensure_data_dir_exists(path: &Path) -> Result<(), FreezeThawError> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(FreezeThawError::DataDirNotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(FreezeThawError::DataDirNotFound(path.to_path_buf()))
        }
        Err(e) => Err(FreezeThawError::DataDirAccess(path.to_path_buf(), e)),
    }
}
