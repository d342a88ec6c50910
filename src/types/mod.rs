pub mod season;
pub mod station;
pub mod variability;
