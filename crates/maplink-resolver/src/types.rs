use maplink_parser::{CoordinateSource, ResolvedLocation};
use serde::Serialize;
use std::time::Duration;

use crate::error::ResolveError;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_MAX_REDIRECTS: usize = 10;
pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; GoogleMapsResolver/1.0)";

/// Settings for the resolver's HTTP client
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A successfully resolved map link
#[derive(Debug, Clone)]
pub struct Resolution {
    pub final_url: String,
    pub parsed: ResolvedLocation,
    pub coordinate_source: Option<CoordinateSource>,
}

/// Boundary result of a resolve call, serialized as
/// `{success, finalUrl?, parsed?, error?}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ResolvedLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            final_url: None,
            parsed: None,
            error: Some(message.into()),
        }
    }
}

impl From<Resolution> for ResolveOutcome {
    fn from(resolution: Resolution) -> Self {
        Self {
            success: true,
            final_url: Some(resolution.final_url),
            parsed: Some(resolution.parsed),
            error: None,
        }
    }
}

impl From<std::result::Result<Resolution, ResolveError>> for ResolveOutcome {
    fn from(result: std::result::Result<Resolution, ResolveError>) -> Self {
        match result {
            Ok(resolution) => resolution.into(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
