use tracing::info;

use super::password::hash_password;
use crate::{
    config::AuthConfig,
    db::dao::{DaoContext, NewUser},
    error::AppError,
};

/// Creates the configured admin account once; later starts leave it alone.
pub async fn seed_admin(daos: &DaoContext, cfg: &AuthConfig) -> Result<(), AppError> {
    let users = daos.user();
    if users.find_by_email(&cfg.admin_email).await?.is_some() {
        info!("admin user already present");
        return Ok(());
    }

    let password_hash = hash_password(&cfg.admin_password)?;
    let admin = users
        .create_user(NewUser {
            email: cfg.admin_email.clone(),
            username: cfg.admin_username.clone(),
            password_hash,
            is_active: true,
            is_admin: true,
        })
        .await?;
    info!(user_id = %admin.id, "seeded admin user");
    Ok(())
}
