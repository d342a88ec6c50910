use crate::seasons::error::SeasonDataError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FreezeThawError {
    #[error(transparent)]
    SeasonData(#[from] SeasonDataError),

    #[error("Failed to determine data directory")]
    DataDirResolution(#[source] std::io::Error),

    #[error("Data directory '{0}' does not exist")]
    DataDirNotFound(PathBuf),

    #[error("Data path '{0}' exists but is not a directory")]
    DataDirNotADirectory(PathBuf),

    #[error("Failed to inspect data directory '{0}'")]
    DataDirAccess(PathBuf, #[source] std::io::Error),
}
