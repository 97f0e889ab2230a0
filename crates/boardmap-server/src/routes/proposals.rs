use axum::extract::State;
use axum::Json;
use boardmap_markers::{Angle, Coords, NewMarker, ProposalStatus, ProposedMarker};
use chrono::Utc;
use local_state::ToastKind;
use tracing::{info, warn};

use crate::error::AppError;
use crate::server::SharedState;
use crate::types::{ProposeMarkerRequest, ProposeMarkerResponse};

const ANONYMOUS_SUBMITTER: &str = "anonymous";

/// Submit a marker proposal for review, subject to the daily quota
///
/// A quota slot is reserved before the push and handed back if the store
/// rejects the proposal, so parallel submissions cannot overshoot the limit.
pub async fn propose_marker(
    State(state): State<SharedState>,
    Json(body): Json<ProposeMarkerRequest>,
) -> Result<Json<ProposeMarkerResponse>, AppError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }

    let coords = Coords {
        lat: body.coords.lat,
        lng: body.coords.lng,
    };
    if !coords.is_valid() {
        return Err(AppError::BadRequest("Invalid coordinates".into()));
    }

    let local = &state.local;
    let Some(count) = local.quota.try_reserve(state.daily_limit) else {
        let message = format!(
            "Daily limit of {} submissions reached, try again tomorrow",
            state.daily_limit
        );
        local.events.toast(message.clone(), ToastKind::Error);
        return Err(AppError::TooManyRequests(message));
    };

    let proposal = ProposedMarker {
        url: non_blank(body.url),
        marker: NewMarker {
            title: title.to_string(),
            coords,
            layout: body.layout,
            angle: body.angle.into_iter().map(Angle::Degrees).collect(),
            website: non_blank(body.website),
            instagram: non_blank(body.instagram),
        },
        status: ProposalStatus::Pending,
        submitted_at: Utc::now().timestamp_millis(),
        submitted_by: non_blank(body.submitted_by)
            .unwrap_or_else(|| ANONYMOUS_SUBMITTER.to_string()),
    };

    let name = match state.markers.push_proposed_marker(&proposal).await {
        Ok(name) => name,
        Err(e) => {
            warn!(title = %proposal.marker.title, error = %e, "Proposal was not stored");
            local.quota.release();
            local
                .events
                .toast(format!("Could not submit marker: {}", e), ToastKind::Error);
            return Err(AppError::Upstream(e.to_string()));
        }
    };

    local
        .events
        .toast("Marker submitted for review", ToastKind::Success);
    info!(key = %name, count, "Marker proposal submitted");

    Ok(Json(ProposeMarkerResponse {
        review_url: state.markers.proposed_marker_url(&name),
        name,
        count,
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
