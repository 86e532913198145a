use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, UNEXPECTED_ERROR};

pub type ApiResult<T> = Result<JsonApiResponse<T>, AppError>;

/// Successful JSON reply. The body is `data` itself; `204` replies carry no body.
#[derive(Debug)]
pub struct JsonApiResponse<T: Serialize> {
    pub status: StatusCode,
    pub data: T,
    pub headers: HeaderMap,
}

impl<T: Serialize> JsonApiResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status,
            data,
            headers: HeaderMap::new(),
        }
    }

    pub fn ok(data: T) -> ApiResult<T> {
        Ok(Self::new(StatusCode::OK, data))
    }

    pub fn with_status(status: StatusCode, data: T) -> ApiResult<T> {
        Ok(Self::new(status, data))
    }

    pub fn with_cookie(mut self, cookie: HeaderValue) -> Self {
        self.headers.append(header::SET_COOKIE, cookie);
        self
    }

    pub fn with_cookies(self, cookies: impl IntoIterator<Item = HeaderValue>) -> Self {
        cookies
            .into_iter()
            .fold(self, |response, cookie| response.with_cookie(cookie))
    }
}

impl JsonApiResponse<()> {
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, ())
    }
}

/// `{"detail": "..."}` body used by every generic message.
#[derive(Debug, Clone, Serialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            log_app_error(&self, status);
        }
        (status, Json(error_body(&self))).into_response()
    }
}

impl<T: Serialize> IntoResponse for JsonApiResponse<T> {
    fn into_response(self) -> Response {
        let mut response = if self.status == StatusCode::NO_CONTENT {
            self.status.into_response()
        } else {
            (self.status, Json(self.data)).into_response()
        };
        response.headers_mut().extend(self.headers);
        response
    }
}

fn error_body(err: &AppError) -> serde_json::Value {
    match err {
        AppError::Validation(errors) => json!({ "detail": errors }),
        AppError::Internal { .. } => json!({ "detail": UNEXPECTED_ERROR }),
        other => json!({ "detail": other.message() }),
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_app_error(err: &AppError, status: StatusCode) {
    match err.source_error() {
        Some(source) => tracing::error!(
            status = status.as_u16(),
            error = %err.message(),
            source = %source,
            "request failed"
        ),
        None => tracing::error!(status = status.as_u16(), error = %err.message(), "request failed"),
    }
}
