use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::TokenGenerator, config::AppConfig, mail::Mailer, sessions::SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub sessions: Arc<dyn SessionStore>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: TokenGenerator,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        sessions: Arc<dyn SessionStore>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenGenerator,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            sessions,
            mailer,
            tokens,
        })
    }
}
