use std::sync::Arc;

use axum::{Router, middleware};

use crate::{middleware::csrf_guard, state::AppState};

use super::api;

pub const API_PREFIX: &str = "/api/v1";

/// Every API route sits behind the CSRF check; unsafe methods need a matching token.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().nest(
        API_PREFIX,
        api::router(state.clone()).layer(middleware::from_fn_with_state(state, csrf_guard)),
    )
}
