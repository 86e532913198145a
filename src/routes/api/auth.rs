use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::{
    auth::crypto::random_token,
    middleware::{CurrentUser, clear_session_cookie, csrf_cookie, session_cookie},
    response::{ApiResult, Detail, JsonApiResponse},
    services::{
        ServiceContext,
        account_service::{ACTIVATED, REGISTERED, RESET_DONE, RESET_REQUESTED},
        forms::{
            ChangePasswordForm, DeleteAccountForm, LoginForm, NewPasswordForm,
            PasswordResetRequestForm, RegisterForm,
        },
        user_service::ProfileResponse,
    },
    state::AppState,
};

const BASE_PATH: &str = "/auth";

pub fn router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/csrf_cookie", get(csrf_cookie_handler))
        .route("/is_authenticated", get(is_authenticated))
        .route("/register", post(register))
        .route("/activate_account/{uidb64}/{token}", post(activate_account))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/logout_all", post(logout_all))
        .route(
            "/request_change_known_password",
            post(request_password_reset),
        )
        .route(
            "/confirm_change_known_password/{uidb64}/{token}",
            put(confirm_password_reset),
        )
        .route("/change_password", put(change_password))
        .route("/delete_account", delete(delete_account))
        .with_state(state);

    Router::new().nest(BASE_PATH, routes)
}

/// Re-issues the session's token when logged in, a fresh one otherwise.
async fn csrf_cookie_handler(
    State(state): State<Arc<AppState>>,
    session: Option<CurrentUser>,
) -> ApiResult<Detail> {
    let token = session
        .map(|CurrentUser(session)| session.payload.csrf)
        .unwrap_or_else(random_token);
    let cookie = csrf_cookie(&state.config, &token)?;
    Ok(JsonApiResponse::new(StatusCode::OK, Detail::new("CSRF cookie set")).with_cookie(cookie))
}

async fn is_authenticated(CurrentUser(session): CurrentUser) -> ApiResult<ProfileResponse> {
    JsonApiResponse::ok(ProfileResponse::from(&session.user))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> ApiResult<String> {
    let services = ServiceContext::from_state(state.as_ref());
    services.account(state.as_ref()).register(&form).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, REGISTERED.to_string())
}

async fn activate_account(
    State(state): State<Arc<AppState>>,
    Path((uidb64, token)): Path<(String, String)>,
) -> ApiResult<String> {
    let services = ServiceContext::from_state(state.as_ref());
    services
        .account(state.as_ref())
        .activate(&uidb64, &token)
        .await?;
    JsonApiResponse::ok(ACTIVATED.to_string())
}

async fn login(
    State(state): State<Arc<AppState>>,
    previous: Option<CurrentUser>,
    Json(form): Json<LoginForm>,
) -> ApiResult<ProfileResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let previous_key = previous.map(|CurrentUser(session)| session.key);
    let opened = services
        .account(state.as_ref())
        .login(&form, previous_key.as_deref())
        .await?;

    let cookies = [
        session_cookie(&state.config, &opened.session.key)?,
        csrf_cookie(&state.config, &opened.csrf)?,
    ];
    let profile = ProfileResponse::from(&opened.user);
    Ok(JsonApiResponse::new(StatusCode::OK, profile).with_cookies(cookies))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
) -> ApiResult<()> {
    let services = ServiceContext::from_state(state.as_ref());
    services.account(state.as_ref()).logout(&session.key).await?;
    Ok(JsonApiResponse::no_content().with_cookie(clear_session_cookie(&state.config)?))
}

async fn logout_all(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
) -> ApiResult<()> {
    let services = ServiceContext::from_state(state.as_ref());
    services
        .account(state.as_ref())
        .logout_all(&session.user.id)
        .await?;
    Ok(JsonApiResponse::no_content().with_cookie(clear_session_cookie(&state.config)?))
}

async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PasswordResetRequestForm>,
) -> ApiResult<String> {
    let services = ServiceContext::from_state(state.as_ref());
    services
        .account(state.as_ref())
        .request_password_reset(&form)
        .await?;
    JsonApiResponse::ok(RESET_REQUESTED.to_string())
}

async fn confirm_password_reset(
    State(state): State<Arc<AppState>>,
    Path((uidb64, token)): Path<(String, String)>,
    Json(form): Json<NewPasswordForm>,
) -> ApiResult<String> {
    let services = ServiceContext::from_state(state.as_ref());
    services
        .account(state.as_ref())
        .confirm_password_reset(&uidb64, &token, &form)
        .await?;
    JsonApiResponse::ok(RESET_DONE.to_string())
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Json(form): Json<ChangePasswordForm>,
) -> ApiResult<()> {
    let services = ServiceContext::from_state(state.as_ref());
    let opened = services
        .account(state.as_ref())
        .change_password(&session.user, &session.key, &form)
        .await?;

    let cookies = [
        session_cookie(&state.config, &opened.session.key)?,
        csrf_cookie(&state.config, &opened.csrf)?,
    ];
    Ok(JsonApiResponse::no_content().with_cookies(cookies))
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Json(form): Json<DeleteAccountForm>,
) -> ApiResult<()> {
    let services = ServiceContext::from_state(state.as_ref());
    services
        .account(state.as_ref())
        .delete_account(&session.user, &form)
        .await?;
    Ok(JsonApiResponse::no_content().with_cookie(clear_session_cookie(&state.config)?))
}
