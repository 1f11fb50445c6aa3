//! eBird recent-sightings payload → [`BirdReport`].

use serde_json::Value;

use super::{UNKNOWN, f64_or, i64_or, string_or};
use crate::model::{BirdObservation, BirdReport, FrequencyTable, Geo};

/// The frequency table is truncated to this many species.
const TOP_SPECIES: usize = 10;

/// Map raw eBird sightings into the canonical report.
///
/// Empty input is not an error: it yields the explicit empty-result shape
/// `{birds: [], counts: {}, total: 0}`.
pub fn normalize_sightings(sightings: &[Value]) -> BirdReport {
    if sightings.is_empty() {
        return BirdReport {
            birds: Vec::new(),
            counts: FrequencyTable::default(),
            total: 0,
        };
    }

    let counts =
        FrequencyTable::tally(sightings.iter().map(|s| string_or(s, "comName", UNKNOWN)))
            .top(TOP_SPECIES);

    BirdReport {
        birds: sightings.iter().map(observation).collect(),
        counts,
        total: sightings.len(),
    }
}

/// One canonical observation per input record, with the documented defaults
/// for anything missing.
fn observation(sighting: &Value) -> BirdObservation {
    BirdObservation {
        species: string_or(sighting, "comName", UNKNOWN),
        scientific_name: string_or(sighting, "sciName", UNKNOWN),
        location: string_or(sighting, "locName", UNKNOWN),
        observation_date: string_or(sighting, "obsDt", UNKNOWN),
        count: i64_or(sighting, "howMany", 1),
        coordinates: Geo {
            lat: f64_or(sighting, "lat", 0.0),
            lng: f64_or(sighting, "lng", 0.0),
        },
    }
}
