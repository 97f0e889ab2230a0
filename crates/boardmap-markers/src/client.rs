//! Realtime Database REST client

use crate::error::{MarkerStoreError, Result};
use crate::normalize::normalize_markers;
use crate::types::*;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const MARKERS: &str = "markers";
const PROPOSED_MARKERS: &str = "proposedMarkers";

/// Client for the marker collections in the Realtime Database
///
/// The database is used through its plain REST interface: every collection is
/// `<base>/<name>.json`, a GET returns the whole collection and a POST appends
/// a child under a generated key.
pub struct MarkerStoreClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Stamped<'a> {
    #[serde(flatten)]
    marker: &'a NewMarker,
    created_at: i64,
}

impl MarkerStoreClient {
    /// The project database
    pub const DEFAULT_BASE_URL: &'static str =
        "https://moon-30159-default-rtdb.europe-west1.firebasedatabase.app";

    /// Create a client with the default 30 second timeout
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}.json", self.base_url, collection)
    }

    /// Where a proposal can be inspected after it was pushed
    pub fn proposed_marker_url(&self, key: &str) -> String {
        format!("{}/{}/{}.json", self.base_url, PROPOSED_MARKERS, key)
    }

    /// Fetch all approved markers
    pub async fn list_markers(&self) -> Result<Vec<Marker>> {
        let url = self.collection_url(MARKERS);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        let markers = normalize_markers(body);

        debug!(count = markers.len(), "Loaded markers");
        Ok(markers)
    }

    /// Add an approved marker, stamped with the current time
    ///
    /// Returns the generated key.
    pub async fn push_marker(&self, marker: &NewMarker) -> Result<String> {
        let body = Stamped {
            marker,
            created_at: Utc::now().timestamp_millis(),
        };
        let key = self.push(MARKERS, &body).await?;
        info!(title = %marker.title, key = %key, "Pushed marker");
        Ok(key)
    }

    /// Add a proposal for review
    ///
    /// Returns the generated key.
    pub async fn push_proposed_marker(&self, proposal: &ProposedMarker) -> Result<String> {
        let key = self.push(PROPOSED_MARKERS, proposal).await?;
        info!(
            title = %proposal.marker.title,
            key = %key,
            submitted_by = %proposal.submitted_by,
            "Pushed proposed marker"
        );
        Ok(key)
    }

    async fn push<T: Serialize + ?Sized>(&self, collection: &str, body: &T) -> Result<String> {
        let url = self.collection_url(collection);
        let response = self.http.post(&url).json(body).send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        let data: PushResponse = serde_json::from_slice(&bytes)?;
        Ok(data.name)
    }
}

impl Default for MarkerStoreClient {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MarkerStoreError::Status { status, body })
}
