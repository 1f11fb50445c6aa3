//! Canonical record shapes returned to API consumers.
//!
//! Field names follow the wire format the consumers already expect
//! (`dominantPollutant`, `lastUpdated`, nested `city.name`), so these structs
//! serialize directly into the documented JSON contracts.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

/// AQI severity bands over the standard breakpoints {50, 100, 150, 200, 300}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Strict ladder, inclusive on the upper end of each band.
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            ..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            AqiCategory::Good => "#00e400",
            AqiCategory::Moderate => "#ffff00",
            AqiCategory::UnhealthyForSensitiveGroups => "#ff7e00",
            AqiCategory::Unhealthy => "#ff0000",
            AqiCategory::VeryUnhealthy => "#99004c",
            AqiCategory::Hazardous => "#7e0023",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CityRef {
    pub name: String,
}

/// Observation time as reported upstream: the raw short form and the ISO
/// form. Unstructured upstream scalars are duplicated into both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservedTime {
    pub s: String,
    pub iso: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
}

/// One per-pollutant reading, always in the object shape even when the
/// upstream sent a bare number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantReading {
    pub v: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AirQualityRecord {
    pub city: CityRef,
    pub aqi: i64,
    pub time: ObservedTime,
    #[serde(rename = "dominantPollutant")]
    pub dominant_pollutant: String,
    pub iaqi: BTreeMap<String, PollutantReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    /// Opaque passthrough of the upstream forecast block, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Value>,
    pub category: AqiCategory,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BirdObservation {
    pub species: String,
    pub scientific_name: String,
    pub location: String,
    pub observation_date: String,
    pub count: i64,
    pub coordinates: Geo,
}

/// Species name → occurrence count, ordered by descending count with
/// first-seen order breaking ties. Serializes as a JSON map in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable(Vec<(String, u32)>);

impl FrequencyTable {
    pub fn tally<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut order: Vec<(String, u32)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for name in names {
            match index.get(&name) {
                Some(&at) => order[at].1 += 1,
                None => {
                    index.insert(name.clone(), order.len());
                    order.push((name, 1));
                }
            }
        }

        // Stable sort keeps first-seen order between equal counts.
        order.sort_by(|a, b| b.1.cmp(&a.1));
        Self(order)
    }

    pub fn top(mut self, n: usize) -> Self {
        self.0.truncate(n);
        self
    }

    pub fn entries(&self) -> &[(String, u32)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BirdReport {
    pub birds: Vec<BirdObservation>,
    pub counts: FrequencyTable,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub parameter: String,
    pub value: f64,
    pub unit: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollutionLocation {
    pub name: String,
    pub city: String,
    pub coordinates: Coordinates,
    pub measurements: Vec<Measurement>,
}

/// Per-parameter occurrence counts and arithmetic means across all locations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollutantSummary {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub averages: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollutionReport {
    pub locations: Vec<PollutionLocation>,
    pub pollutants: PollutantSummary,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: String,
    pub source: String,
    pub date: DateTime<Utc>,
    pub link: String,
    pub summary: String,
}

/// Composite served by the deforestation endpoint: observatory articles plus
/// whatever forest statistics were available at refresh time.
#[derive(Debug, Clone, Serialize)]
pub struct DeforestationReport {
    pub timestamp: DateTime<Utc>,
    pub articles: Vec<Article>,
    pub forest_data: Value,
    pub source: String,
}
