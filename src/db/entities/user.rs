use sea_orm::entity::prelude::*;

use crate::db::dao::base_traits::{
    HasCreatedAtColumn, HasIdActiveModel, HasIdColumn, TimestampedActiveModel,
};

/// `email` and `username_normalized` are stored lowercased so the unique
/// indexes enforce case-insensitive uniqueness; `username` keeps the casing
/// the user registered with.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub username: String,
    #[sea_orm(unique)]
    pub username_normalized: String,
    pub password_hash: String,
    #[sea_orm(default_value = false)]
    pub is_active: bool,
    #[sea_orm(default_value = false)]
    pub is_admin: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(has_many)]
    pub cars: HasMany<super::car::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl HasIdActiveModel for ActiveModel {
    fn set_id(&mut self, id: Uuid) {
        self.id = sea_orm::ActiveValue::Set(id);
    }
}

impl TimestampedActiveModel for ActiveModel {
    fn set_created_at(&mut self, ts: DateTimeWithTimeZone) {
        self.created_at = sea_orm::ActiveValue::Set(ts);
    }

    fn set_updated_at(&mut self, ts: DateTimeWithTimeZone) {
        self.updated_at = sea_orm::ActiveValue::Set(ts);
    }
}

impl HasCreatedAtColumn for Entity {
    fn created_at_column() -> Column {
        Column::CreatedAt
    }
}

impl HasIdColumn for Entity {
    fn id_column() -> Column {
        Column::Id
    }
}
