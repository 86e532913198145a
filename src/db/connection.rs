use sea_orm::DatabaseConnection;
use tracing::info;

use super::providers::{default_registry, redact_url};
use crate::config::DatabaseConfig;

pub const ENTITY_REGISTRY_PATH: &str = "car_notes::db::entities::*";

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let provider = default_registry()?.provider_for_url(&cfg.url)?;
    info!(
        backend = provider.id().as_str(),
        url = %redact_url(&cfg.url),
        "connecting to database"
    );

    let db = provider.connect(cfg).await?;
    provider.post_connect(&db, cfg).await?;
    sync_schema(&db).await?;
    Ok(db)
}

pub async fn sync_schema(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("syncing database schema from entities");
    db.get_schema_registry(ENTITY_REGISTRY_PATH).sync(db).await?;
    Ok(())
}
