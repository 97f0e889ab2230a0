use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::server::SharedState;
use crate::types::HealthResponse;

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
    })
}
