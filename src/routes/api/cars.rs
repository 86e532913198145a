use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    auth::AdminRole,
    middleware::{AuthRoleGuard, CurrentUser},
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        car_filter::CarListQuery,
        car_service::{CarListResponse, CarRecord, CarScope},
        forms::CarForm,
    },
    state::AppState,
};

const BASE_PATH: &str = "/cars";

pub fn router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/admin", get(admin_list_cars))
        .route("/admin/{id}", get(admin_get_car).delete(admin_delete_car))
        .route("/{id}", get(get_car).put(update_car).delete(delete_car))
        .with_state(state);

    Router::new().nest(BASE_PATH, routes)
}

async fn list_cars(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<CarListQuery>,
) -> ApiResult<CarListResponse> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    let cars = service.list(CarScope::Owner(session.user.id), &query).await?;
    JsonApiResponse::ok(cars)
}

async fn create_car(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Json(form): Json<CarForm>,
) -> ApiResult<CarRecord> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    let car = service.create(session.user.id, &form).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, car)
}

async fn get_car(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<CarRecord> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    let car = service.get(CarScope::Owner(session.user.id), &id).await?;
    JsonApiResponse::ok(car)
}

async fn update_car(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<CarForm>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    service.update(session.user.id, &id, &form).await?;
    Ok(JsonApiResponse::no_content())
}

async fn delete_car(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    service.delete(CarScope::Owner(session.user.id), &id).await?;
    Ok(JsonApiResponse::no_content())
}

async fn admin_list_cars(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Query(query): Query<CarListQuery>,
) -> ApiResult<CarListResponse> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    let cars = service.list(CarScope::All, &query).await?;
    JsonApiResponse::ok(cars)
}

async fn admin_get_car(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<String>,
) -> ApiResult<CarRecord> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    let car = service.get(CarScope::All, &id).await?;
    JsonApiResponse::ok(car)
}

async fn admin_delete_car(
    State(state): State<Arc<AppState>>,
    admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let service = ServiceContext::from_state(state.as_ref()).cars(state.as_ref());
    service.delete(CarScope::All, &id).await?;
    tracing::info!(car_id = %id, admin_id = %admin.session.user.id, "admin deleted car note");
    Ok(JsonApiResponse::no_content())
}
