pub mod locate_station;
pub mod matcher;
