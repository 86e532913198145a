pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_SESSION_COOKIE: &str = "sessionid";
pub const DEFAULT_SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_PASSWORD_MIN_LENGTH: i64 = 8;
pub const DEFAULT_MAIL_FROM: &str = "no-reply@car-notes.local";
pub const DEFAULT_CARS_PAGE_SIZE: i64 = 9;
pub const DEFAULT_CARS_MAX_PAGE_SIZE: i64 = 100;
