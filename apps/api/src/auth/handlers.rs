use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{hash_token, new_token, normalize_email, release_orphaned_preview, AuthUser};
use crate::errors::AppError;
use crate::state::AppState;

const HASH_COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    fn checked(&self) -> Result<(String, &str), AppError> {
        let email = normalize_email(&self.email);
        if email.is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".into(),
            ));
        }
        Ok((email, self.password.as_str()))
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (email, password) = req.checked()?;

    let password = password.to_string();
    let password_hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Hashing task failed: {e}"))?
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    let user = state.accounts.create_user(&email, &password_hash).await?;
    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    let (email, password) = req.checked()?;

    let user = state
        .accounts
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let password = password.to_string();
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| anyhow::anyhow!("Verification task failed: {e}"))?
        .unwrap_or(false);
    if !verified {
        return Err(AppError::Unauthorized);
    }

    let token = new_token();
    let expires_at = Utc::now() + Duration::hours(state.config.session_ttl_hours);
    state
        .accounts
        .create_session(user.id, &hash_token(&token), expires_at)
        .await?;

    info!("User {} logged in", user.id);
    Ok(Json(LoginResponse { token, expires_at }))
}

/// POST /api/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    state.accounts.delete_session(&user.token_hash).await?;
    if release_orphaned_preview(&state, user.user_id, Utc::now()).await? {
        debug!("Released preview for user {}", user.user_id);
    }
    Ok(StatusCode::NO_CONTENT)
}
