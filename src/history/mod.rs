pub mod aggregate;
pub mod statistics;
