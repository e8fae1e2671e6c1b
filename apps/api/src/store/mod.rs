//! Persistence behind traits. Handlers only see `Arc<dyn AccountStore>` and
//! `Arc<dyn ProfileStore>`; `PgStore` backs them in production and
//! `MemoryStore` when no database is configured.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<UserRow, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError>;

    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
    /// The owner of an unexpired session, if any.
    async fn resolve_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError>;
    async fn delete_session(&self, token_hash: &str) -> Result<(), AppError>;
    /// Whether the user holds any session still valid at `now`.
    async fn has_live_session(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError>;
    /// Deletes sessions that expired at or before `now`. Returns how many.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// One raw profile document per user. Documents are stored verbatim and
/// upconverted by the caller on load.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_profile(&self, user_id: Uuid) -> Result<Option<Value>, AppError>;
    /// Replaces any existing document. Last writer wins.
    async fn save_profile(&self, user_id: Uuid, document: Value) -> Result<(), AppError>;
    /// Returns whether a document existed.
    async fn delete_profile(&self, user_id: Uuid) -> Result<bool, AppError>;
}
