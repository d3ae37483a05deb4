//! HTTP error type.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

/// Error returned by handlers and extractors.
///
/// Rendered as `{"error": ...}`; server-side failures also carry a
/// `message` with the underlying cause.
#[derive(Debug)]
pub enum ApiError {
    Internal(mindforge_core::Error),
    Upstream(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<mindforge_core::Error> for ApiError {
    fn from(err: mindforge_core::Error) -> Self {
        use mindforge_core::Error;

        if err.is_duplicate_key() {
            return ApiError::Conflict("resource already exists".to_string());
        }
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::Upstream(msg) => ApiError::Upstream(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                serde_json::json!({
                    "error": "internal server error",
                    "message": err.to_string(),
                })
            }
            ApiError::Upstream(msg) => {
                error!(subsystem = "api", error = %msg, "Upstream service failed");
                serde_json::json!({
                    "error": "upstream service failed",
                    "message": msg,
                })
            }
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg) => serde_json::json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}
