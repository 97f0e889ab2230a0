use axum::extract::{Query, State};
use axum::Json;
use local_state::Theme;
use tracing::info;

use crate::error::AppError;
use crate::server::SharedState;
use crate::types::{ThemeBody, ThemeQuery};

/// Saved preference, or the caller's system preference when nothing is saved
pub async fn get_theme(
    State(state): State<SharedState>,
    Query(params): Query<ThemeQuery>,
) -> Json<ThemeBody> {
    let theme = state
        .local
        .theme
        .current(params.system_dark.unwrap_or(false));

    Json(ThemeBody {
        theme: theme.as_str().to_string(),
    })
}

pub async fn set_theme(
    State(state): State<SharedState>,
    Json(body): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, AppError> {
    let theme = Theme::parse(body.theme.trim())
        .ok_or_else(|| AppError::BadRequest("theme must be \"dark\" or \"light\"".into()))?;

    state.local.theme.set(theme)?;
    info!(theme = theme.as_str(), "Theme preference saved");

    Ok(Json(ThemeBody {
        theme: theme.as_str().to_string(),
    }))
}
