use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::db::entities::{car, user};

pub fn ts() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00+00:00").expect("fixture timestamp")
}

pub fn user_model(id: Uuid, email: &str, username: &str) -> user::Model {
    user::Model {
        id,
        email: email.to_string(),
        username: username.to_string(),
        username_normalized: username.to_lowercase(),
        password_hash: "hash".to_string(),
        is_active: true,
        is_admin: false,
        last_login_at: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn car_model(id: Uuid, owner: Uuid, brand: &str, motor: &str) -> car::Model {
    car::Model {
        id,
        user_id: owner,
        brand: brand.to_string(),
        car_model: "A4".to_string(),
        motor: motor.to_string(),
        created_at: ts(),
        updated_at: ts(),
    }
}
