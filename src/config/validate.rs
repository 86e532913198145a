use anyhow::{Result, bail};

use super::{AppConfig, MailTransport};
use crate::db::dao::{CarDao, DaoBase};

const MIN_SECRET_KEY_LEN: usize = 16;
const MAX_CARS_PAGE_SIZE: u64 = <CarDao as DaoBase>::MAX_PAGE_SIZE;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let errors = collect_errors(cfg);

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

fn collect_errors(cfg: &AppConfig) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.frontend_url.trim().is_empty() {
        errors.push("general.frontend_url must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.secret_key.len() < MIN_SECRET_KEY_LEN {
            errors.push(format!(
                "auth.secret_key must be at least {MIN_SECRET_KEY_LEN} bytes"
            ));
        }

        if auth.token_ttl_secs == 0 {
            errors.push("auth.token_ttl_secs must be > 0".to_string());
        }

        if auth.admin_email.trim().is_empty() {
            errors.push("auth.admin_email must not be empty".to_string());
        }

        if auth.admin_username.trim().is_empty() {
            errors.push("auth.admin_username must not be empty".to_string());
        }

        if auth.admin_password.len() < 8 {
            errors.push("auth.admin_password must be at least 8 characters".to_string());
        }
    }

    if cfg.session.cookie_name.trim().is_empty() {
        errors.push("session.cookie_name must not be empty".to_string());
    }

    if cfg.session.ttl_secs == 0 {
        errors.push("session.ttl_secs must be > 0".to_string());
    }

    if cfg.csrf.cookie_name.trim().is_empty() || cfg.csrf.header_name.trim().is_empty() {
        errors.push("csrf.cookie_name and csrf.header_name must not be empty".to_string());
    }

    if cfg.csrf.cookie_name == cfg.session.cookie_name {
        errors.push("csrf.cookie_name must differ from session.cookie_name".to_string());
    }

    if cfg.password.min_length == 0 {
        errors.push("password.min_length must be > 0".to_string());
    }

    if cfg.mail.transport == MailTransport::Http
        && cfg
            .mail
            .http_endpoint
            .as_deref()
            .is_none_or(|endpoint| endpoint.trim().is_empty())
    {
        errors.push("mail.http_endpoint is required when mail.transport = http".to_string());
    }

    if cfg.cars.max_page_size == 0 || cfg.cars.max_page_size > MAX_CARS_PAGE_SIZE {
        errors.push(format!(
            "cars.max_page_size must be between 1 and {MAX_CARS_PAGE_SIZE}"
        ));
    }

    if cfg.cars.page_size == 0 || cfg.cars.page_size > cfg.cars.max_page_size {
        errors.push(format!(
            "cars.page_size ({}) must be between 1 and cars.max_page_size ({})",
            cfg.cars.page_size, cfg.cars.max_page_size
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::{collect_errors, validate};
    use crate::config::{AppConfig, AuthConfig, MailTransport};

    fn auth_config(secret: &str, admin_password: &str) -> AuthConfig {
        AuthConfig {
            secret_key: secret.to_string(),
            token_ttl_secs: 60,
            admin_email: "admin@example.com".to_string(),
            admin_username: "admin".to_string(),
            admin_password: admin_password.to_string(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem_at_once() {
        let mut cfg = AppConfig::default();
        cfg.auth = Some(auth_config("short", "pw"));
        cfg.cars.page_size = 500;

        let errors = collect_errors(&cfg);

        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.starts_with("auth.secret_key")));
        assert!(errors.iter().any(|e| e.starts_with("auth.admin_password")));
        assert!(errors.iter().any(|e| e.starts_with("cars.page_size")));
    }

    #[test]
    fn http_mail_transport_requires_endpoint() {
        let mut cfg = AppConfig::default();
        cfg.mail.transport = MailTransport::Http;

        let err = validate(&cfg).expect_err("config should be rejected");

        assert!(err.to_string().contains("mail.http_endpoint"));
    }
}
