//! boardmap server
//!
//! Backs the climbing-board map front-end: expands shared map links, serves the
//! approved markers, accepts marker proposals under a daily quota, and keeps the
//! local theme preference. State changes are pushed to the browser over SSE.

mod config;
mod error;
mod routes;
mod server;
mod types;

use crate::config::Config;
use crate::error::Result;
use crate::server::{start_server, ServerState, SharedState};
use boardmap_markers::MarkerStoreClient;
use local_state::LocalContext;
use maplink_resolver::{MapLinkResolver, ResolverConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("boardmap_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting boardmap server...");

    let config = Config::from_env();
    info!("Port: {}", config.port);
    info!("Marker store: {}", config.marker_store_url);
    info!("Data dir: {:?}", config.data_dir);
    info!("Daily submission limit: {}", config.daily_limit);
    info!("Resolve timeout: {:?}", config.resolve_timeout);

    let resolver = MapLinkResolver::with_config(ResolverConfig {
        timeout: config.resolve_timeout,
        ..ResolverConfig::default()
    })?;
    let markers = Arc::new(MarkerStoreClient::new(&config.marker_store_url));
    let local = LocalContext::open(config.data_dir.clone())?;

    let state: SharedState = Arc::new(ServerState::new(
        resolver,
        markers,
        local,
        config.daily_limit,
    ));

    // Initial marker load; the feed reports its own errors
    let initial = state.clone();
    tokio::spawn(async move {
        initial.feed.load().await;
    });

    start_server(state, config.port, config.cors_layer()).await?;

    info!("Server stopped");
    Ok(())
}
