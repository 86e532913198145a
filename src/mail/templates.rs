use askama::Template;

use super::{EmailMessage, MailError};

pub const ACTIVATION_SUBJECT: &str = "Activate your user account.";
pub const RESET_SUBJECT: &str = "Password Reset request.";
/// Recipient of the decoy reset email sent for unknown addresses.
pub const PLACEHOLDER_RECIPIENT: &str = "non-existing-email@gmail.com";

#[derive(Template)]
#[template(path = "emails/activate_account.html")]
struct ActivateAccountEmail<'a> {
    username: &'a str,
    link: &'a str,
}

#[derive(Template)]
#[template(path = "emails/reset_password.html")]
struct ResetPasswordEmail<'a> {
    username: &'a str,
    link: &'a str,
}

pub fn activation_link(frontend_url: &str, uid: &str, token: &str) -> String {
    format!("{}/activate/{uid}/{token}/", frontend_url.trim_end_matches('/'))
}

pub fn reset_link(frontend_url: &str, uid: &str, token: &str) -> String {
    format!(
        "{}/confirmChangeForgottenPassword/{uid}/{token}/",
        frontend_url.trim_end_matches('/')
    )
}

pub fn activation_email(
    from: &str,
    to: &str,
    username: &str,
    link: &str,
) -> Result<EmailMessage, MailError> {
    let html_body = ActivateAccountEmail { username, link }.render()?;
    Ok(EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: ACTIVATION_SUBJECT.to_string(),
        html_body,
        text_body: format!("Hi {username},\n\nActivate your account by opening {link}\n"),
    })
}

pub fn reset_email(
    from: &str,
    to: &str,
    username: &str,
    link: &str,
) -> Result<EmailMessage, MailError> {
    let html_body = ResetPasswordEmail { username, link }.render()?;
    Ok(EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: RESET_SUBJECT.to_string(),
        html_body,
        text_body: format!("Hi {username},\n\nReset your password by opening {link}\n"),
    })
}
