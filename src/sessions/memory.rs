use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::RwLock;

use super::{SessionError, SessionPayload, SessionRecord, SessionStore, new_session_key};

/// Process-local store for single-node deployments and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(
        &self,
        payload: &SessionPayload,
        expires_at: DateTime<FixedOffset>,
    ) -> Result<SessionRecord, SessionError> {
        let record = SessionRecord {
            key: new_session_key(),
            user_id: payload.user_id,
            payload: serde_json::to_value(payload)?,
            expires_at,
            updated_at: Utc::now().fixed_offset(),
        };
        self.sessions
            .write()
            .await
            .insert(record.key.clone(), record.clone());
        Ok(record)
    }

    async fn load(
        &self,
        key: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(key)
            .filter(|record| record.expires_at > now)
            .cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, SessionError> {
        Ok(self.sessions.write().await.remove(key).is_some())
    }

    async fn list_active(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<SessionRecord>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|record| record.expires_at > now)
            .cloned()
            .collect())
    }

    async fn purge_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
