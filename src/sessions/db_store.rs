use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

use super::{SessionError, SessionPayload, SessionRecord, SessionStore, new_session_key};
use crate::db::entities::prelude::Session;
use crate::db::entities::session;

#[derive(Clone)]
pub struct DbSessionStore {
    db: DatabaseConnection,
}

impl DbSessionStore {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }
}

impl From<session::Model> for SessionRecord {
    fn from(model: session::Model) -> Self {
        Self {
            key: model.session_key,
            user_id: model.user_id,
            payload: model.payload,
            expires_at: model.expires_at,
            updated_at: model.updated_at,
        }
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn create(
        &self,
        payload: &SessionPayload,
        expires_at: DateTime<FixedOffset>,
    ) -> Result<SessionRecord, SessionError> {
        let model = session::ActiveModel {
            session_key: Set(new_session_key()),
            user_id: Set(payload.user_id),
            payload: Set(serde_json::to_value(payload)?),
            expires_at: Set(expires_at),
            updated_at: Set(Utc::now().fixed_offset()),
        };
        let model = model.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn load(
        &self,
        key: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let model = Session::find_by_id(key.to_string())
            .filter(session::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn delete(&self, key: &str) -> Result<bool, SessionError> {
        let result = Session::delete_by_id(key.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_active(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<SessionRecord>, SessionError> {
        let models = Session::find()
            .filter(session::Column::ExpiresAt.gt(now))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn purge_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, SessionError> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use uuid::Uuid;

    use super::DbSessionStore;
    use crate::db::entities::session;
    use crate::sessions::SessionStore;
    use crate::test_helpers::ts;

    fn session_model(key: &str, user_id: Uuid) -> session::Model {
        session::Model {
            session_key: key.to_string(),
            user_id,
            payload: json!({ "user_id": user_id, "csrf": "c", "auth_hash": "h" }),
            expires_at: ts() + Duration::days(1),
            updated_at: ts(),
        }
    }

    #[tokio::test]
    async fn load_maps_row_to_record() {
        let user_id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model("abc", user_id)]])
            .into_connection();
        let store = DbSessionStore::new(&db);

        let record = store
            .load("abc", ts())
            .await
            .expect("load should succeed")
            .expect("session should exist");

        assert_eq!(record.key, "abc");
        assert_eq!(record.decode().map(|p| p.user_id), Some(user_id));
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let store = DbSessionStore::new(&db);

        let deleted = store.delete("gone").await.expect("delete should succeed");
        assert!(!deleted);
    }
}
