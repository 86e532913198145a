use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, MailError, Mailer};

/// Development transport: the message goes to the log instead of a mailbox.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.text_body,
            "email"
        );
        Ok(())
    }
}
