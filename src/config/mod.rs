pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, CarsConfig, CsrfConfig, DatabaseConfig, GeneralConfig, LoggingConfig,
    MailConfig, MailTransport, PasswordConfig, SessionBackend, SessionConfig,
};
pub use envconfig::EnvConfig;
