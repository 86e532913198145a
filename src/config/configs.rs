use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: Option<AuthConfig>,
    pub session: SessionConfig,
    pub csrf: CsrfConfig,
    pub password: PasswordConfig,
    pub mail: MailConfig,
    pub cars: CarsConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
    /// Base of the links embedded in activation and reset emails.
    pub frontend_url: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
            frontend_url: defaults::DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Signs activation/reset tokens, session auth hashes and nothing else.
    pub secret_key: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    pub admin_email: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Database,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_secs: u64,
    pub secure_cookies: bool,
    pub backend: SessionBackend,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: defaults::DEFAULT_SESSION_COOKIE.to_string(),
            ttl_secs: defaults::DEFAULT_SESSION_TTL_SECS as u64,
            secure_cookies: false,
            backend: SessionBackend::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: defaults::DEFAULT_CSRF_COOKIE.to_string(),
            header_name: defaults::DEFAULT_CSRF_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub reject_numeric: bool,
    pub reject_common: bool,
    pub reject_similar: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: defaults::DEFAULT_PASSWORD_MIN_LENGTH as usize,
            reject_numeric: true,
            reject_common: true,
            reject_similar: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    #[default]
    Log,
    Http,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    pub from_address: String,
    pub transport: MailTransport,
    pub http_endpoint: Option<String>,
    pub http_api_key: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: defaults::DEFAULT_MAIL_FROM.to_string(),
            transport: MailTransport::default(),
            http_endpoint: None,
            http_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarsConfig {
    pub page_size: u64,
    pub max_page_size: u64,
}

impl Default for CarsConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::DEFAULT_CARS_PAGE_SIZE as u64,
            max_page_size: defaults::DEFAULT_CARS_MAX_PAGE_SIZE as u64,
        }
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}

fn default_token_ttl_secs() -> u64 {
    defaults::DEFAULT_TOKEN_TTL_SECS as u64
}

fn default_admin_username() -> String {
    defaults::DEFAULT_ADMIN_USERNAME.to_string()
}
