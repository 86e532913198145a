use axum::http::{HeaderMap, HeaderValue, header};
use cookie::{Cookie, SameSite, time::Duration};

use crate::{config::AppConfig, error::AppError};

/// Browsers keep the anti-forgery cookie for a year, like the session-less
/// token it is.
const CSRF_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 364;

/// First value of cookie `name` across every `Cookie` header.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(cfg: &AppConfig, key: &str) -> Result<HeaderValue, AppError> {
    build(cfg, &cfg.session.cookie_name, key, cfg.session.ttl_secs, true)
}

pub fn clear_session_cookie(cfg: &AppConfig) -> Result<HeaderValue, AppError> {
    build(cfg, &cfg.session.cookie_name, "", 0, true)
}

/// Readable by scripts so the frontend can echo it in the csrf header.
pub fn csrf_cookie(cfg: &AppConfig, token: &str) -> Result<HeaderValue, AppError> {
    build(
        cfg,
        &cfg.csrf.cookie_name,
        token,
        CSRF_COOKIE_MAX_AGE_SECS,
        false,
    )
}

fn build(
    cfg: &AppConfig,
    name: &str,
    value: &str,
    max_age_secs: u64,
    http_only: bool,
) -> Result<HeaderValue, AppError> {
    let max_age = Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX));
    let cookie = Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .http_only(http_only)
        .secure(cfg.session.secure_cookies)
        .build();
    HeaderValue::from_str(&cookie.to_string())
        .map_err(|err| AppError::internal_with_source("invalid cookie value", err))
}
