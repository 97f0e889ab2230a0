use std::env;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::{header, Method};
use boardmap_markers::MarkerStoreClient;
use local_state::DEFAULT_DAILY_LIMIT;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub marker_store_url: String,
    pub data_dir: PathBuf,
    pub resolve_timeout: Duration,
    pub daily_limit: u32,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(3005);

        let marker_store_url = ["MARKER_STORE_URL", "FIREBASE_DB_URL", "NUXT_PUBLIC_FIREBASE_DB"]
            .iter()
            .filter_map(|key| lookup(key))
            .find(|url| !url.trim().is_empty())
            .unwrap_or_else(|| MarkerStoreClient::DEFAULT_BASE_URL.to_string());

        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let resolve_timeout = lookup("RESOLVE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        let daily_limit = lookup("SUBMIT_DAILY_LIMIT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DAILY_LIMIT);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        Self {
            port,
            marker_store_url,
            data_dir,
            resolve_timeout,
            daily_limit,
            cors_origins,
        }
    }

    pub fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.iter().any(|o| o == "*") {
            return CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
        }

        let origins: Vec<_> = self
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::CONTENT_TYPE])
    }
}
