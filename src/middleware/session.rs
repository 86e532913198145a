use axum::http::request::Parts;
use chrono::Utc;
use tracing::debug;

use super::cookies::parse_cookie;
use crate::{
    db::entities::user, error::AppError, services::ServiceContext, sessions::SessionPayload,
    state::AppState,
};

/// A live session together with the user it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub key: String,
    pub payload: SessionPayload,
    pub user: user::Model,
}

#[derive(Clone)]
struct ResolvedSession(Option<AuthSession>);

/// Looks up the session named by the request's cookie, once per request.
///
/// Sessions that can no longer authenticate are deleted on sight: the
/// payload does not decode, the user is gone or inactive, or the password
/// changed after login.
pub async fn resolve_session(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<AuthSession>, AppError> {
    if let Some(ResolvedSession(session)) = parts.extensions.get::<ResolvedSession>() {
        return Ok(session.clone());
    }

    let session = load_session(parts, state).await?;
    parts.extensions.insert(ResolvedSession(session.clone()));
    Ok(session)
}

async fn load_session(parts: &Parts, state: &AppState) -> Result<Option<AuthSession>, AppError> {
    let Some(key) = parse_cookie(&parts.headers, &state.config.session.cookie_name) else {
        return Ok(None);
    };
    let Some(record) = state
        .sessions
        .load(&key, Utc::now().fixed_offset())
        .await?
    else {
        return Ok(None);
    };

    let services = ServiceContext::from_state(state);
    let user = match record.decode() {
        Some(payload) => services
            .user()
            .find(&payload.user_id)
            .await?
            .map(|user| (payload, user)),
        None => None,
    };

    match user {
        Some((payload, user))
            if user.is_active && services.account(state).session_matches(&payload, &user) =>
        {
            Ok(Some(AuthSession { key, payload, user }))
        }
        _ => {
            debug!("discarding session that can no longer authenticate");
            state.sessions.delete(&key).await?;
            Ok(None)
        }
    }
}
