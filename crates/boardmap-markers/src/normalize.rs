//! Turning a `GET /markers.json` body into a list of markers

use serde_json::Value;
use tracing::warn;

use crate::types::Marker;

/// Normalize whatever the store returned for a collection
///
/// - `null` (empty collection) becomes an empty list
/// - an array is taken as-is; `null` holes are skipped
/// - an object keyed by push ids becomes one marker per entry, with the key as `id`
///
/// Entries that don't decode as markers are skipped with a warning rather than
/// failing the whole list.
pub fn normalize_markers(body: Value) -> Vec<Marker> {
    match body {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .filter_map(|item| decode(None, item))
            .collect(),
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(key, item)| decode(Some(key), item))
            .collect(),
        other => {
            warn!(kind = kind_of(&other), "Unexpected marker collection shape");
            Vec::new()
        }
    }
}

fn decode(key: Option<String>, mut item: Value) -> Option<Marker> {
    if let (Some(key), Value::Object(fields)) = (&key, &mut item) {
        fields.insert("id".to_string(), Value::String(key.clone()));
    }
    match serde_json::from_value::<Marker>(item) {
        Ok(marker) => Some(marker),
        Err(e) => {
            warn!(key = key.as_deref().unwrap_or("-"), error = %e, "Skipping undecodable marker");
            None
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
