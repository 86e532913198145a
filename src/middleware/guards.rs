use std::{marker::PhantomData, sync::Arc};

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use super::session::{AuthSession, resolve_session};
use crate::{
    auth::RequiredRole, error::AppError, services::user_service::role_of, state::AppState,
};

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Auth guard: the caller's live session and user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthSession);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized(NOT_AUTHENTICATED))
    }
}

impl OptionalFromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(resolve_session(parts, state).await?.map(CurrentUser))
    }
}

pub struct AuthRoleGuard<R: RequiredRole> {
    pub session: AuthSession,
    _marker: PhantomData<R>,
}

impl<R> FromRequestParts<Arc<AppState>> for AuthRoleGuard<R>
where
    R: RequiredRole,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(session) =
            <CurrentUser as FromRequestParts<Arc<AppState>>>::from_request_parts(parts, state)
                .await?;

        if !role_of(&session.user).satisfies(R::required()) {
            return Err(AppError::forbidden(PERMISSION_DENIED));
        }

        Ok(Self {
            session,
            _marker: PhantomData,
        })
    }
}
