//! Registration and login.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::services::AuthToken;
use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub action: Option<String>,
}

/// `POST /api/auth` dispatching on `action`.
///
/// Every failure is a 400 with the reason in `error`.
pub async fn auth(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<AuthToken>, ApiError> {
    match body.action.as_deref() {
        Some("register") => register(State(state), Json(body)).await,
        Some("login") => login(State(state), Json(body)).await,
        other => Err(ApiError::BadRequest(format!(
            "unknown action: {}",
            other.unwrap_or("(none)")
        ))),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<AuthToken>, ApiError> {
    let token = state
        .auth
        .register(&body.email, &body.password)
        .await
        .map_err(client_error)?;
    Ok(Json(token))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<AuthToken>, ApiError> {
    let token = state
        .auth
        .login(&body.email, &body.password)
        .await
        .map_err(client_error)?;
    Ok(Json(token))
}

/// Auth failures of any kind surface as 400, except server faults.
fn client_error(err: mindforge_core::Error) -> ApiError {
    match ApiError::from(err) {
        ApiError::NotFound(msg) | ApiError::Conflict(msg) | ApiError::Unauthorized(msg) => {
            ApiError::BadRequest(msg)
        }
        other => other,
    }
}
