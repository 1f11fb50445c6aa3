//! OpenAQ `latest` payload → [`PollutionReport`].

use std::collections::BTreeMap;

use serde_json::Value;

use super::{UNKNOWN, f64_or, string_or};
use crate::model::{
    Coordinates, Measurement, PollutantSummary, PollutionLocation, PollutionReport,
};

/// Map a raw OpenAQ `latest` payload into the canonical report, accumulating
/// per-parameter occurrence counts and running sums across all locations.
/// Averages divide sum by count, so only parameters that occurred can appear.
pub fn normalize_latest(payload: &Value) -> PollutionReport {
    let results = payload
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    if results.is_empty() {
        return PollutionReport {
            locations: Vec::new(),
            pollutants: PollutantSummary::default(),
            total: 0,
        };
    }

    let mut locations = Vec::with_capacity(results.len());
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();

    for entry in results {
        let raw_measurements = entry
            .get("measurements")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut measurements = Vec::with_capacity(raw_measurements.len());
        for raw in raw_measurements {
            let m = measurement(raw);
            *counts.entry(m.parameter.clone()).or_insert(0) += 1;
            *sums.entry(m.parameter.clone()).or_insert(0.0) += m.value;
            measurements.push(m);
        }

        locations.push(PollutionLocation {
            name: string_or(entry, "location", UNKNOWN),
            city: string_or(entry, "city", UNKNOWN),
            coordinates: coordinates(entry),
            measurements,
        });
    }

    let averages = sums
        .iter()
        .map(|(parameter, sum)| (parameter.clone(), sum / f64::from(counts[parameter])))
        .collect();

    PollutionReport {
        total: locations.len(),
        locations,
        pollutants: PollutantSummary { counts, averages },
    }
}

fn measurement(raw: &Value) -> Measurement {
    Measurement {
        parameter: string_or(raw, "parameter", UNKNOWN),
        value: f64_or(raw, "value", 0.0),
        unit: string_or(raw, "unit", ""),
        last_updated: string_or(raw, "lastUpdated", UNKNOWN),
    }
}

/// OpenAQ nests coordinates one level down; absent fields default to 0.
fn coordinates(entry: &Value) -> Coordinates {
    let nested = entry.get("coordinates");
    Coordinates {
        latitude: nested.map_or(0.0, |c| f64_or(c, "latitude", 0.0)),
        longitude: nested.map_or(0.0, |c| f64_or(c, "longitude", 0.0)),
    }
}
