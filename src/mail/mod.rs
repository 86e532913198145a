mod http;
mod log;
mod recording;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

pub use http::HttpMailer;
pub use log::LogMailer;
pub use recording::RecordingMailer;

use crate::config::{MailConfig, MailTransport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("failed to render email template: {0}")]
    Render(#[from] askama::Error),
    #[error("mail transport request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail transport misconfigured: {0}")]
    Config(String),
    #[error("mail delivery rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

pub fn build_mailer(cfg: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match cfg.transport {
        MailTransport::Log => Ok(Arc::new(LogMailer)),
        MailTransport::Http => {
            let endpoint = cfg
                .http_endpoint
                .clone()
                .ok_or_else(|| MailError::Config("mail.http_endpoint is not set".to_string()))?;
            Ok(Arc::new(HttpMailer::new(endpoint, cfg.http_api_key.clone())?))
        }
    }
}
