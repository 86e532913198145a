use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::{Car, User};
use crate::db::entities::{car, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Insert payload; `email` and `username` are stored normalized by [`UserDao::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
}

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(normalize(email)))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::UsernameNormalized.eq(normalize(username)))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Login lookup by email or username. One user's username can equal
    /// another user's email; the email owner wins.
    pub async fn find_by_identifier(&self, identifier: &str) -> DaoResult<Option<user::Model>> {
        let identifier = normalize(identifier);
        let candidates = User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(identifier.clone()))
                    .add(user::Column::UsernameNormalized.eq(identifier.clone())),
            )
            .limit(2)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        let by_email = candidates.iter().position(|u| u.email == identifier);
        Ok(match by_email {
            Some(index) => candidates.into_iter().nth(index),
            None => candidates.into_iter().next(),
        })
    }

    pub async fn create_user(&self, new_user: NewUser) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(normalize(&new_user.email)),
            username_normalized: Set(normalize(&new_user.username)),
            username: Set(new_user.username.trim().to_string()),
            password_hash: Set(new_user.password_hash),
            is_active: Set(new_user.is_active),
            is_admin: Set(new_user.is_admin),
            last_login_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn set_last_login(
        &self,
        id: &Uuid,
        at: &chrono::DateTime<chrono::FixedOffset>,
    ) -> DaoResult<user::Model> {
        let at = *at;
        self.update(*id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
    }

    pub async fn activate(&self, id: &Uuid) -> DaoResult<user::Model> {
        self.update(*id, |active| {
            active.is_active = Set(true);
        })
        .await
    }

    pub async fn set_password_hash(&self, id: &Uuid, hash: &str) -> DaoResult<user::Model> {
        let hash = hash.to_string();
        self.update(*id, move |active| {
            active.password_hash = Set(hash);
        })
        .await
    }

    /// Removes the user and every car they own in one transaction.
    pub async fn delete_with_cars(&self, id: &Uuid) -> DaoResult<u64> {
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let cars = Car::delete_many()
            .filter(car::Column::UserId.eq(*id))
            .exec(&txn)
            .await
            .map_err(DaoLayerError::Db)?;
        let deleted = User::delete_by_id(*id)
            .exec(&txn)
            .await
            .map_err(DaoLayerError::Db)?;
        if deleted.rows_affected == 0 {
            txn.rollback().await.map_err(DaoLayerError::Db)?;
            return Err(DaoLayerError::NotFound {
                entity: std::any::type_name::<User>(),
                id: *id,
            });
        }

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(cars.rows_affected)
    }
}
