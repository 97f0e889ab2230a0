//! Observable marker list with loading/error flags

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::MarkerStoreClient;
use crate::types::Marker;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkerSnapshot {
    pub markers: Vec<Marker>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Latest marker list, refreshed on demand
///
/// A failed load leaves an empty list and the error message, never a stale
/// list from an earlier load.
pub struct MarkerFeed {
    client: Arc<MarkerStoreClient>,
    tx: watch::Sender<MarkerSnapshot>,
}

impl MarkerFeed {
    pub fn new(client: Arc<MarkerStoreClient>) -> Self {
        let (tx, _) = watch::channel(MarkerSnapshot::default());
        Self { client, tx }
    }

    pub fn snapshot(&self) -> MarkerSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MarkerSnapshot> {
        self.tx.subscribe()
    }

    /// Reload from the store and return the resulting snapshot
    pub async fn load(&self) -> MarkerSnapshot {
        self.tx.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.client.list_markers().await;

        self.tx.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(markers) => {
                    info!(count = markers.len(), "Marker feed refreshed");
                    s.markers = markers;
                }
                Err(e) => {
                    warn!(error = %e, "Marker feed refresh failed");
                    s.markers = Vec::new();
                    s.error = Some(e.to_string());
                }
            }
        });

        self.snapshot()
    }
}
