mod error;
mod freeze_thaw;
mod history;
mod seasons;
mod stations;
mod types;
mod utils;

pub use error::FreezeThawError;
pub use freeze_thaw::*;

pub use types::season::*;
pub use types::station::*;
pub use types::variability::*;

pub use stations::locate_station::*;
pub use stations::matcher::{CountyMatcher, StationMatcher};

pub use history::aggregate::*;
pub use history::statistics::*;

pub use seasons::error::SeasonDataError;
pub use seasons::reader::SeasonFileFormat;
pub use seasons::store::SeasonStore;
pub use seasons::SeasonSource;
