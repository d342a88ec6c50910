//! Looks up the nearest freeze-thaw station for a location and prints its season history.
//!
//! Usage: cargo run --example analyze_location -- <data-folder> <state> <lat> <lon>

use freeze_thaw::{Analysis, FreezeThaw, FreezeThawError, LatLon};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), FreezeThawError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let data_folder = args.first().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));
    let state = args.get(1).map(String::as_str).unwrap_or("Colorado");
    let lat = args.get(2).and_then(|v| v.parse().ok()).unwrap_or(39.7392);
    let lon = args.get(3).and_then(|v| v.parse().ok()).unwrap_or(-104.9903);

    let client = FreezeThaw::with_data_folder(data_folder)?;
    println!("Seasons available: {:?}", client.seasons());

    let analysis = client
        .analyze()
        .location(LatLon(lat, lon))
        .state(state)
        .call();

    match analysis {
        Analysis::NoSeasons => println!("No season files found."),
        Analysis::UnknownState { available_states } => {
            println!("No stations for '{}'. Known states: {:?}", state, available_states)
        }
        Analysis::NoStationWithinRadius { candidates } => {
            println!("No station within range. Stations in {}:", state);
            for candidate in candidates {
                println!("  {}", candidate.county_clean());
            }
        }
        Analysis::NoHistory { station, coverage } => println!(
            "{} ({:.1} km away) has no history; {} seasons empty, {} unmatched",
            station.county_clean(),
            station.distance_km,
            coverage.empty.len(),
            coverage.unmatched.len()
        ),
        Analysis::Complete {
            station,
            result,
            seasons_available,
        } => {
            println!(
                "Nearest station: {}, {} ({:.1} km away)",
                station.county_clean(),
                station.state(),
                station.distance_km
            );
            println!(
                "Seasons with data: {} of {}",
                result.records.len(),
                seasons_available
            );
            for record in &result.records {
                println!(
                    "  {}: {} total, {} damaging",
                    record.season_id, record.total_cycles, record.damaging_cycles
                );
            }
            let trend = result.trend();
            println!(
                "All-time average: {:.1} total ({} variability), {:.1} damaging ({} variability)",
                result.all_time.total_avg,
                result.all_time.total_variability(),
                result.all_time.damaging_avg,
                result.all_time.damaging_variability()
            );
            println!(
                "Recent trend: total {:?}, damaging {:?}",
                trend.total, trend.damaging
            );
        }
    }

    Ok(())
}
