//! Pure mapping of heterogeneous upstream payloads into canonical records.
//!
//! Upstream APIs disagree on field names, nesting, and types, so each
//! canonical field is extracted by its own small rule function. The rules are
//! ordered (try shape A, then shape B, then the documented default) and
//! tested independently per shape variant.

pub mod aqi;
pub mod birds;
pub mod pollution;

use serde_json::Value;

pub(crate) const UNKNOWN: &str = "Unknown";

/// String at `key`, or `default` when the field is missing or not a string.
pub(crate) fn string_or(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

pub(crate) fn f64_or(value: &Value, key: &str, default: f64) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(default)
}

pub(crate) fn i64_or(value: &Value, key: &str, default: i64) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(default)
}
