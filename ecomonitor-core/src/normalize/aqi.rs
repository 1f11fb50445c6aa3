//! AQICN feed payload → [`AirQualityRecord`].

use std::collections::BTreeMap;

use serde_json::Value;

use super::{UNKNOWN, string_or};
use crate::error::{Error, Result};
use crate::model::{AirQualityRecord, AqiCategory, CityRef, Geo, ObservedTime, PollutantReading};

/// Map a raw AQICN feed payload into the canonical record.
///
/// A non-"ok" status or a missing numeric AQI is a structured error for the
/// caller to surface; nothing in here panics on malformed input.
pub fn normalize_aqi(payload: &Value) -> Result<AirQualityRecord> {
    let status = payload.get("status").and_then(Value::as_str).unwrap_or("");
    if status != "ok" {
        return Err(Error::ProviderStatus {
            raw_status: status.to_string(),
        });
    }

    let empty = Value::Object(Default::default());
    let data = payload.get("data").unwrap_or(&empty);

    // Without a usable AQI the consumer has nothing to render.
    let aqi = aqi_value(data).ok_or_else(|| {
        Error::MissingData("No AQI data available for this location".to_string())
    })?;
    let category = AqiCategory::from_aqi(aqi);

    Ok(AirQualityRecord {
        city: CityRef { name: city_name(data) },
        aqi,
        time: observed_time(data),
        dominant_pollutant: string_or(data, "dominentpol", UNKNOWN),
        iaqi: pollutant_readings(data),
        geo: geo(data),
        forecast: forecast(data),
        category,
        color: category.color().to_string(),
    })
}

/// AQICN reports "-" instead of a number when a station has no index.
fn aqi_value(data: &Value) -> Option<i64> {
    match data.get("aqi")? {
        Value::Number(aqi) => aqi.as_i64().or_else(|| aqi.as_f64().map(|v| v.round() as i64)),
        _ => None,
    }
}

/// City arrives either as a plain string or as an object carrying a `name`.
fn city_name(data: &Value) -> String {
    match data.get("city") {
        Some(Value::Object(city)) => city
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN)
            .to_string(),
        Some(Value::String(city)) => city.clone(),
        _ => UNKNOWN.to_string(),
    }
}

/// Structured `{s, iso}` objects pass through; bare scalars are duplicated
/// into both subfields.
fn observed_time(data: &Value) -> ObservedTime {
    match data.get("time") {
        Some(Value::Object(time)) => ObservedTime {
            s: time.get("s").and_then(Value::as_str).unwrap_or("").to_string(),
            iso: time.get("iso").and_then(Value::as_str).unwrap_or("").to_string(),
        },
        Some(scalar) => {
            let raw = scalar_to_string(scalar);
            ObservedTime { s: raw.clone(), iso: raw }
        }
        None => ObservedTime {
            s: String::new(),
            iso: String::new(),
        },
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Geo arrives as a `[lat, lng]` pair; anything shorter or non-numeric is dropped.
fn geo(data: &Value) -> Option<Geo> {
    let pair = data.get("geo")?.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    Some(Geo {
        lat: pair[0].as_f64()?,
        lng: pair[1].as_f64()?,
    })
}

/// Per-pollutant values arrive either bare or wrapped in `{v: ...}`; both
/// normalize to the object shape. Unusable entries are skipped.
fn pollutant_readings(data: &Value) -> BTreeMap<String, PollutantReading> {
    let mut readings = BTreeMap::new();
    let Some(iaqi) = data.get("iaqi").and_then(Value::as_object) else {
        return readings;
    };

    for (pollutant, value) in iaqi {
        let reading = match value {
            Value::Object(wrapped) => wrapped.get("v").and_then(Value::as_f64).map(|v| {
                PollutantReading {
                    v,
                    unit: wrapped.get("unit").and_then(Value::as_str).map(str::to_string),
                }
            }),
            Value::Number(bare) => bare.as_f64().map(|v| PollutantReading { v, unit: None }),
            _ => None,
        };
        if let Some(reading) = reading {
            readings.insert(pollutant.clone(), reading);
        }
    }

    readings
}

fn forecast(data: &Value) -> Option<Value> {
    data.get("forecast").filter(|f| f.is_object()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok_payload(data: Value) -> Value {
        json!({ "status": "ok", "data": data })
    }

    #[test]
    fn non_ok_status_is_a_structured_error() {
        let err = normalize_aqi(&json!({ "status": "nug", "data": {} })).unwrap_err();
        match err {
            Error::ProviderStatus { raw_status } => assert_eq!(raw_status, "nug"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_aqi_is_a_structured_error() {
        let err = normalize_aqi(&ok_payload(json!({ "city": "Beijing" }))).unwrap_err();
        assert!(matches!(err, Error::MissingData(_)));
    }

    #[test]
    fn non_numeric_aqi_is_a_structured_error() {
        let err = normalize_aqi(&ok_payload(json!({ "aqi": "-" }))).unwrap_err();
        assert!(matches!(err, Error::MissingData(_)));
    }

    #[test]
    fn city_as_object_uses_its_name() {
        let record = normalize_aqi(&ok_payload(json!({
            "aqi": 42,
            "city": { "name": "Beijing" }
        })))
        .unwrap();
        assert_eq!(record.city.name, "Beijing");
    }

    #[test]
    fn city_as_plain_string_passes_through() {
        let record = normalize_aqi(&ok_payload(json!({ "aqi": 42, "city": "Shanghai" }))).unwrap();
        assert_eq!(record.city.name, "Shanghai");
    }

    #[test]
    fn missing_or_ambiguous_city_defaults_to_unknown() {
        let record = normalize_aqi(&ok_payload(json!({ "aqi": 42 }))).unwrap();
        assert_eq!(record.city.name, "Unknown");

        let record = normalize_aqi(&ok_payload(json!({ "aqi": 42, "city": 7 }))).unwrap();
        assert_eq!(record.city.name, "Unknown");
    }

    #[test]
    fn structured_time_keeps_both_fields() {
        let record = normalize_aqi(&ok_payload(json!({
            "aqi": 42,
            "time": { "s": "2024-05-01 12:00:00", "iso": "2024-05-01T12:00:00+08:00" }
        })))
        .unwrap();
        assert_eq!(record.time.s, "2024-05-01 12:00:00");
        assert_eq!(record.time.iso, "2024-05-01T12:00:00+08:00");
    }

    #[test]
    fn scalar_time_is_duplicated_into_both_fields() {
        let record =
            normalize_aqi(&ok_payload(json!({ "aqi": 42, "time": "yesterday" }))).unwrap();
        assert_eq!(record.time.s, "yesterday");
        assert_eq!(record.time.iso, "yesterday");

        let record = normalize_aqi(&ok_payload(json!({ "aqi": 42, "time": 1714500000 }))).unwrap();
        assert_eq!(record.time.s, "1714500000");
        assert_eq!(record.time.iso, "1714500000");
    }

    #[test]
    fn bare_and_wrapped_pollutant_values_both_normalize() {
        let record = normalize_aqi(&ok_payload(json!({
            "aqi": 42,
            "iaqi": {
                "pm25": { "v": 12.5 },
                "o3": 31,
                "junk": "n/a"
            }
        })))
        .unwrap();

        assert_eq!(record.iaqi["pm25"].v, 12.5);
        assert_eq!(record.iaqi["o3"].v, 31.0);
        assert!(!record.iaqi.contains_key("junk"));
    }

    #[test]
    fn geo_pair_is_extracted_and_short_pairs_dropped() {
        let record = normalize_aqi(&ok_payload(json!({
            "aqi": 42,
            "geo": [39.9, 116.4]
        })))
        .unwrap();
        assert_eq!(record.geo, Some(Geo { lat: 39.9, lng: 116.4 }));

        let record = normalize_aqi(&ok_payload(json!({ "aqi": 42, "geo": [39.9] }))).unwrap();
        assert_eq!(record.geo, None);
    }

    #[test]
    fn forecast_passes_through_opaquely() {
        let forecast = json!({ "daily": { "pm25": [{ "avg": 70 }] } });
        let record = normalize_aqi(&ok_payload(json!({
            "aqi": 42,
            "forecast": forecast.clone()
        })))
        .unwrap();
        assert_eq!(record.forecast, Some(forecast));
    }

    #[test]
    fn category_and_color_follow_the_breakpoints() {
        let record = normalize_aqi(&ok_payload(json!({ "aqi": 50 }))).unwrap();
        assert_eq!(record.category, AqiCategory::Good);
        assert_eq!(record.color, "#00e400");

        let record = normalize_aqi(&ok_payload(json!({ "aqi": 51 }))).unwrap();
        assert_eq!(record.category, AqiCategory::Moderate);
        assert_eq!(record.color, "#ffff00");

        let record = normalize_aqi(&ok_payload(json!({ "aqi": 301 }))).unwrap();
        assert_eq!(record.category, AqiCategory::Hazardous);
        assert_eq!(record.color, "#7e0023");
    }

    #[test]
    fn full_record_serializes_to_the_wire_shape() {
        let record = normalize_aqi(&ok_payload(json!({
            "aqi": 152,
            "city": { "name": "Delhi" },
            "dominentpol": "pm25",
            "time": { "s": "s", "iso": "iso" },
            "iaqi": { "pm25": 152 }
        })))
        .unwrap();

        let rendered = serde_json::to_value(&record).unwrap();
        assert_eq!(
            rendered,
            json!({
                "city": { "name": "Delhi" },
                "aqi": 152,
                "time": { "s": "s", "iso": "iso" },
                "dominantPollutant": "pm25",
                "iaqi": { "pm25": { "v": 152.0 } },
                "category": "Unhealthy",
                "color": "#ff0000"
            })
        );
    }
}
