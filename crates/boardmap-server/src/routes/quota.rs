use axum::extract::State;
use axum::Json;

use crate::server::SharedState;
use crate::types::QuotaResponse;

pub async fn get_quota(State(state): State<SharedState>) -> Json<QuotaResponse> {
    let quota = &state.local.quota;
    let today = quota.state_today();
    let can_submit = !quota.is_attached() || today.count < state.daily_limit;

    Json(QuotaResponse {
        date: today.date,
        count: today.count,
        limit: state.daily_limit,
        can_submit,
    })
}
