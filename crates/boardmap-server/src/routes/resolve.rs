use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use tracing::debug;

use crate::server::SharedState;
use crate::types::{ResolveMapUrlRequest, ResolveMapUrlResponse};

/// Expand a shared map link and extract its location
///
/// Always answers 200; failures are reported in the body. A missing or
/// malformed body is treated like a request without a url.
pub async fn resolve_map_url(
    State(state): State<SharedState>,
    body: Bytes,
) -> Json<ResolveMapUrlResponse> {
    let request: ResolveMapUrlRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!(error = %e, "Unreadable resolve request body");
        ResolveMapUrlRequest::default()
    });
    let url = request.url.unwrap_or_default();

    let cancel = state.shutdown.child_token();
    let outcome = state.resolver.resolve(&url, &cancel).await;

    Json(outcome.into())
}
