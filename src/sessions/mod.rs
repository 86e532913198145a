//! Server-side sessions keyed by an opaque random key.
//!
//! Stores never interpret the payload beyond storing it; callers decode it
//! with [`SessionRecord::decode`]. Every lookup treats expired rows as absent.

mod db_store;
mod memory;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub use db_store::DbSessionStore;
pub use memory::MemorySessionStore;

use crate::config::{SessionBackend, SessionConfig};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub user_id: Uuid,
    pub csrf: String,
    pub auth_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub key: String,
    pub user_id: Uuid,
    pub payload: serde_json::Value,
    pub expires_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl SessionRecord {
    /// `None` for payloads written by something else or in an older shape.
    pub fn decode(&self) -> Option<SessionPayload> {
        serde_json::from_value(self.payload.clone()).ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Db(#[from] DbErr),
    #[error("session payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(
        &self,
        payload: &SessionPayload,
        expires_at: DateTime<FixedOffset>,
    ) -> Result<SessionRecord, SessionError>;

    async fn load(
        &self,
        key: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<SessionRecord>, SessionError>;

    /// Delete-if-exists. Returns whether a row was removed.
    async fn delete(&self, key: &str) -> Result<bool, SessionError>;

    async fn list_active(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<SessionRecord>, SessionError>;

    async fn purge_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, SessionError>;
}

pub fn build_store(cfg: &SessionConfig, db: &DatabaseConnection) -> Arc<dyn SessionStore> {
    match cfg.backend {
        SessionBackend::Database => Arc::new(DbSessionStore::new(db)),
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
    }
}

/// Hourly sweep of expired sessions; the first run happens immediately.
pub fn spawn_purge_task(store: Arc<dyn SessionStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now().fixed_offset()).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "purged expired sessions"),
                Err(err) => tracing::warn!(error = %err, "session purge failed"),
            }
        }
    })
}

pub(crate) fn new_session_key() -> String {
    crate::auth::crypto::random_token()
}
