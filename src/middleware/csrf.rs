use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use super::{cookies::parse_cookie, session::resolve_session};
use crate::{auth::crypto::constant_time_eq, error::AppError, state::AppState};

pub const CSRF_FAILED: &str = "CSRF Failed: CSRF token missing or incorrect.";

/// Double-submit check for state-changing methods: the csrf header must equal
/// the csrf cookie, and the token stored in the caller's session if there is one.
pub async fn csrf_guard(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !requires_token(req.method()) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let cfg = &state.config.csrf;
    let cookie = parse_cookie(&parts.headers, &cfg.cookie_name);
    let header = parts
        .headers
        .get(cfg.header_name.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let token = match (cookie, header) {
        (Some(cookie), Some(header)) if constant_time_eq(&cookie, &header) => header,
        _ => return Err(AppError::forbidden(CSRF_FAILED)),
    };

    if let Some(session) = resolve_session(&mut parts, &state).await? {
        if !constant_time_eq(&session.payload.csrf, &token) {
            return Err(AppError::forbidden(CSRF_FAILED));
        }
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

fn requires_token(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}
