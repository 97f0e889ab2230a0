//! Marker records as stored in the Realtime Database
//!
//! Records written by different tools over time don't agree on every field:
//! `coords` shows up both as `{lat, lng}` and as `[lat, lng]`, and `angle`
//! holds numbers in some records and strings in others. Decoding accepts all of
//! them; encoding always writes the object form. Only `coords` is required;
//! anything odd in the other fields is read as loosely as possible rather than
//! dropping the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Latitude/longitude of a marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCoords")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoords {
    Object { lat: f64, lng: f64 },
    Pair([f64; 2]),
}

impl From<RawCoords> for Coords {
    fn from(raw: RawCoords) -> Self {
        match raw {
            RawCoords::Object { lat, lng } => Self { lat, lng },
            RawCoords::Pair([lat, lng]) => Self { lat, lng },
        }
    }
}

impl Coords {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Wall angle of a board, usually in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Angle {
    Degrees(u32),
    Fractional(f64),
    Label(String),
    Other(Value),
}

/// A list field that may also hold a single value or `null`; entries that
/// don't fit `T` are skipped
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Text that may have been stored as a number
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Epoch milliseconds as a number or numeric string; anything else is unset
fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    })
}

/// An approved gym marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Store-assigned key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub coords: Coords,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    /// Board layouts, e.g. "MB 2024"
    #[serde(default, deserialize_with = "lenient_list")]
    pub layout: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub angle: Vec<Angle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    /// Epoch milliseconds
    #[serde(
        default,
        deserialize_with = "lenient_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Marker fields supplied when creating a marker or a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMarker {
    pub title: String,
    pub coords: Coords,
    #[serde(default)]
    pub layout: Vec<String>,
    #[serde(default)]
    pub angle: Vec<Angle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Moderation state of a proposed marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
}

/// A user-submitted marker waiting for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedMarker {
    /// The map link the submission was filled in from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub marker: NewMarker,
    pub status: ProposalStatus,
    /// Epoch milliseconds
    pub submitted_at: i64,
    pub submitted_by: String,
}

/// Response to a POST: the generated child key
#[derive(Debug, Deserialize)]
pub(crate) struct PushResponse {
    pub(crate) name: String,
}
