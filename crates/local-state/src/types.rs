//! State and event types

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Daily submission count, valid only for `date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub date: NaiveDate,
    #[serde(deserialize_with = "lenient_count")]
    pub count: u32,
}

impl QuotaState {
    pub fn empty(date: NaiveDate) -> Self {
        Self { date, count: 0 }
    }
}

/// Accepts numbers, numeric strings and junk (read as 0)
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let count = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// What reading the stored quota found
#[derive(Debug)]
pub enum QuotaLoad {
    /// Stored state for today
    Current(QuotaState),
    /// Stored state from an earlier day, counts as zero today
    Stale(QuotaState),
    /// Nothing stored yet
    Missing,
    /// Slot held something that isn't a quota record
    Corrupt(String),
    /// The slot could not be read, or there is no storage at all
    Unavailable(String),
}

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

/// A short user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    /// Milliseconds
    #[serde(serialize_with = "duration_millis")]
    pub duration: Duration,
}

fn duration_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Events published on the local bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEvent {
    QuotaChanged(QuotaState),
    Toast(Toast),
    ThemeChanged(Theme),
}

impl LocalEvent {
    /// Event name used by subscribers that dispatch on strings
    pub fn name(&self) -> &'static str {
        match self {
            LocalEvent::QuotaChanged(_) => "quota-changed",
            LocalEvent::Toast(_) => "toast",
            LocalEvent::ThemeChanged(_) => "theme-changed",
        }
    }

    /// JSON payload carried by the event
    pub fn payload(&self) -> serde_json::Value {
        match self {
            LocalEvent::QuotaChanged(state) => serde_json::json!(state),
            LocalEvent::Toast(toast) => serde_json::json!(toast),
            LocalEvent::ThemeChanged(theme) => serde_json::json!({ "theme": theme }),
        }
    }
}
