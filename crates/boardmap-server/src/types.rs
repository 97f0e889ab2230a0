//! Request and response bodies for the HTTP API
//!
//! TypeScript bindings for these are exported to `bindings/` for the map
//! front-end.

use chrono::NaiveDate;
use maplink_resolver::{ResolveOutcome, ResolvedLocation};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResolveMapUrlRequest {
    #[ts(optional)]
    pub url: Option<String>,
}

/// Location data pulled from a resolved map URL
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParsedLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lng: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub title: Option<String>,
}

impl From<ResolvedLocation> for ParsedLocation {
    fn from(location: ResolvedLocation) -> Self {
        Self {
            lat: location.lat().map(str::to_string),
            lng: location.lng().map(str::to_string),
            title: location.title().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResolveMapUrlResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub parsed: Option<ParsedLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl From<ResolveOutcome> for ResolveMapUrlResponse {
    fn from(outcome: ResolveOutcome) -> Self {
        Self {
            success: outcome.success,
            final_url: outcome.final_url,
            parsed: outcome.parsed.map(ParsedLocation::from),
            error: outcome.error,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct QuotaResponse {
    pub date: NaiveDate,
    pub count: u32,
    pub limit: u32,
    pub can_submit: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CoordsInput {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ProposeMarkerRequest {
    /// Map link the form was filled in from
    #[ts(optional)]
    pub url: Option<String>,
    pub title: String,
    pub coords: CoordsInput,
    #[serde(default)]
    pub layout: Vec<String>,
    /// Wall angles in degrees
    #[serde(default)]
    pub angle: Vec<u32>,
    #[ts(optional)]
    pub website: Option<String>,
    #[ts(optional)]
    pub instagram: Option<String>,
    #[ts(optional)]
    pub submitted_by: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ProposeMarkerResponse {
    /// Store key of the new proposal
    pub name: String,
    pub review_url: String,
    /// Submissions made today, including this one
    pub count: u32,
}

#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ThemeQuery {
    #[ts(optional)]
    pub system_dark: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ThemeBody {
    /// `dark` or `light`
    pub theme: String,
}
