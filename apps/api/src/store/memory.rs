use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{SessionRow, UserRow};
use crate::store::{AccountStore, ProfileStore};

/// Process-local store. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRow>>,
    sessions: RwLock<HashMap<String, SessionRow>>,
    profiles: RwLock<HashMap<Uuid, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<UserRow, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(AppError::Conflict(format!(
                "Email {email} is already registered"
            )));
        }
        let user = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.sessions.write().await.insert(
            token_hash.to_string(),
            SessionRow {
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn resolve_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(token_hash)
            .filter(|s| s.expires_at > now)
            .map(|s| s.user_id))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), AppError> {
        self.sessions.write().await.remove(token_hash);
        Ok(())
    }

    async fn has_live_session(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .any(|s| s.user_id == user_id && s.expires_at > now))
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load_profile(&self, user_id: Uuid) -> Result<Option<Value>, AppError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn save_profile(&self, user_id: Uuid, document: Value) -> Result<(), AppError> {
        self.profiles.write().await.insert(user_id, document);
        Ok(())
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self.profiles.write().await.remove(&user_id).is_some())
    }
}
