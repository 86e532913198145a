use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{auth, cars};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router(state.clone()))
        .merge(cars::router(state))
}
