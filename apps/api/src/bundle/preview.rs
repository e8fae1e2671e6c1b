use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::template::TemplateKey;

/// A rendered single-file preview held for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewArtifact {
    pub html: String,
    pub template: TemplateKey,
    pub created_at: DateTime<Utc>,
}

/// At most one live preview per user. Storing a new preview releases the
/// previous one.
#[derive(Debug, Default)]
pub struct PreviewSlots {
    slots: RwLock<HashMap<Uuid, Arc<PreviewArtifact>>>,
}

impl PreviewSlots {
    /// Stores `artifact` as the user's preview and returns the one it replaced.
    pub async fn replace(
        &self,
        user_id: Uuid,
        artifact: PreviewArtifact,
    ) -> Option<Arc<PreviewArtifact>> {
        self.slots.write().await.insert(user_id, Arc::new(artifact))
    }

    pub async fn current(&self, user_id: Uuid) -> Option<Arc<PreviewArtifact>> {
        self.slots.read().await.get(&user_id).cloned()
    }

    /// Releases the user's preview once they have no live session.
    pub async fn clear(&self, user_id: Uuid) -> bool {
        self.slots.write().await.remove(&user_id).is_some()
    }

    /// Users currently holding a preview.
    pub async fn owners(&self) -> Vec<Uuid> {
        self.slots.read().await.keys().copied().collect()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}
