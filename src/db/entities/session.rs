use sea_orm::entity::prelude::*;

/// Server-side session row. `payload` is the authoritative copy of the
/// session contents; `user_id` mirrors it for indexing only.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_key: String,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub payload: Json,
    #[sea_orm(indexed)]
    pub expires_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}
