//! Minimal identity: email + bcrypt password, opaque bearer sessions.

pub mod handlers;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub token_hash: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let token_hash = hash_token(token);

        match state.accounts.resolve_session(&token_hash, Utc::now()).await? {
            Some(user_id) => Ok(AuthUser {
                user_id,
                token_hash,
            }),
            None => {
                debug!("Rejected unknown or expired session");
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// A fresh random session token.
pub fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// Hex SHA-256 of a token; the only form in which tokens are stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Releases the user's preview unless another of their sessions is still live.
pub async fn release_orphaned_preview(
    state: &AppState,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    if state.accounts.has_live_session(user_id, now).await? {
        return Ok(false);
    }
    Ok(state.previews.clear(user_id).await)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions: u64,
    pub previews: usize,
}

/// Deletes expired sessions, then releases previews left without a live owner.
pub async fn sweep_expired_sessions(
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<SweepReport, AppError> {
    let sessions = state.accounts.purge_expired_sessions(now).await?;
    let mut previews = 0;
    for user_id in state.previews.owners().await {
        if release_orphaned_preview(state, user_id, now).await? {
            previews += 1;
        }
    }
    Ok(SweepReport { sessions, previews })
}

/// Runs `sweep_expired_sessions` every `every` for the life of the process.
pub fn spawn_session_sweeper(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(every).await;
            match sweep_expired_sessions(&state, Utc::now()).await {
                Ok(report) if report != SweepReport::default() => info!(
                    "Swept {} expired sessions and {} orphaned previews",
                    report.sessions, report.previews
                ),
                Ok(_) => {}
                Err(e) => error!("Session sweep failed: {e}"),
            }
        }
    })
}
