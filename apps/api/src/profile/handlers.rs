use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::profile::legacy::upconvert;
use crate::profile::record::ProfileDocument;
use crate::state::AppState;

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileDocument>, AppError> {
    let stored = state
        .profiles
        .load_profile(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No saved profile".into()))?;
    Ok(Json(upconvert(stored)?))
}

/// POST /api/profile
pub async fn handle_save_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ProfileDocument>,
) -> Result<StatusCode, AppError> {
    req.content.validate()?;

    let document = ProfileDocument::new(req.content, req.template_id);
    let value = serde_json::to_value(&document)
        .map_err(|e| anyhow::anyhow!("Failed to serialize profile: {e}"))?;
    state.profiles.save_profile(user.user_id, value).await?;

    info!(
        "Saved profile for user {} (template {})",
        user.user_id, document.template_id
    );
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/profile
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    if state.profiles.delete_profile(user.user_id).await? {
        info!("Deleted profile for user {}", user.user_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("No saved profile".into()))
    }
}
