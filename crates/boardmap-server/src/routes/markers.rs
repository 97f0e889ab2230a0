use axum::extract::State;
use axum::Json;
use boardmap_markers::MarkerSnapshot;

use crate::server::SharedState;

/// Current marker list without touching the store
pub async fn list_markers(State(state): State<SharedState>) -> Json<MarkerSnapshot> {
    Json(state.feed.snapshot())
}

pub async fn refresh_markers(State(state): State<SharedState>) -> Json<MarkerSnapshot> {
    Json(state.feed.load().await)
}
