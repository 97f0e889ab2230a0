use maplink_parser::{match_coordinates, parse_map_url};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ResolveError, Result};
use crate::types::{Resolution, ResolveOutcome, ResolverConfig};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Follows shared map links to their expanded URL and parses location data
pub struct MapLinkResolver {
    client: reqwest::Client,
}

impl MapLinkResolver {
    /// Create a resolver with default settings
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default()).expect("Failed to create HTTP client")
    }

    /// Create a resolver with a custom timeout, redirect limit and user agent
    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        // Short links get blocked more often without browser-like headers
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Resolve a map link, reporting any failure in the returned outcome
    pub async fn resolve(&self, url: &str, cancel: &CancellationToken) -> ResolveOutcome {
        let result = self.try_resolve(url, cancel).await;
        if let Err(ref e) = result {
            warn!(url, error = %e, "Failed to resolve map link");
        }
        result.into()
    }

    /// Follow redirects for `url` and parse the URL the chain ends on
    pub async fn try_resolve(&self, url: &str, cancel: &CancellationToken) -> Result<Resolution> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ResolveError::MissingUrl);
        }

        let parsed_url = Url::parse(url).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(ResolveError::InvalidUrl(format!(
                "unsupported scheme {}",
                parsed_url.scheme()
            )));
        }

        debug!(url, "Following map link");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
            response = self.client.get(parsed_url).send() => response?,
        };

        // The landing page status doesn't matter, only where the chain ended
        let final_url = response.url().to_string();
        drop(response);

        Ok(resolution_for(final_url))
    }
}

impl Default for MapLinkResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the final URL of a redirect chain
pub(crate) fn resolution_for(final_url: String) -> Resolution {
    let parsed = parse_map_url(&final_url);
    let coordinate_source = match_coordinates(&final_url).map(|(_, source)| source);

    debug!(
        final_url = %final_url,
        source = coordinate_source.map(|s| s.as_str()).unwrap_or("none"),
        title = parsed.title().unwrap_or(""),
        "Parsed map link"
    );

    Resolution {
        final_url,
        parsed,
        coordinate_source,
    }
}
