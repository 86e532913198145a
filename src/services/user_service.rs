use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::Role,
    db::dao::{DaoBase, DaoLayerError, UserDao},
    db::entities::user,
    error::AppError,
};

/// Public view of a user. Email, password hash, activation state and last
/// login never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTimeWithTimeZone,
}

impl From<&user::Model> for UserProfile {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            is_admin: model.is_admin,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

impl From<&user::Model> for ProfileResponse {
    fn from(model: &user::Model) -> Self {
        Self { user: model.into() }
    }
}

pub fn role_of(model: &user::Model) -> Role {
    Role::for_admin_flag(model.is_admin)
}

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub async fn find(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        match self.user_dao.find_by_id(*id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::{ProfileResponse, UserService};
    use crate::db::dao::{DaoBase, UserDao};
    use crate::db::entities::user;
    use crate::test_helpers::user_model;

    #[tokio::test]
    async fn find_maps_missing_user_to_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = UserService::new(UserDao::new(&db));

        let found = service.find(&Uuid::now_v7()).await.expect("query should succeed");
        assert!(found.is_none());
    }

    #[test]
    fn profile_hides_private_fields() {
        let model = user_model(Uuid::now_v7(), "alice@example.com", "alice");

        let json =
            serde_json::to_value(ProfileResponse::from(&model)).expect("profile should serialize");
        let user = json["user"].as_object().expect("user should be an object");

        let mut keys: Vec<_> = user.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["created_at", "id", "is_admin", "username"]);
    }
}
