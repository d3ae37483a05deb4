//! Admin endpoints: user management, feedback review, dashboard stats.
//!
//! Any authenticated caller may use them; there is no role model.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use mindforge_core::{AdminStats, Feedback, Page, User};

use super::PageQuery;
use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    pub email: String,
    pub new_password: String,
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<User>>, ApiError> {
    Ok(Json(state.auth.list_users(query.request()).await?))
}

pub async fn user_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.auth.user_by_email(&query.email).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if caller.id() == id {
        warn!(user_id = id, "User is deleting their own account");
    }
    state.auth.delete_user(id).await?;
    info!(by = caller.id(), user_id = id, "Admin deleted user");
    Ok(Json(json!({ "success": true })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .reset_password(&body.email, &body.new_password)
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Feedback>>, ApiError> {
    Ok(Json(state.db.feedback.list_page(query.request()).await?))
}

/// Dashboard aggregates, recomputed on every call.
pub async fn stats(State(state): State<AppState>) -> Result<Json<AdminStats>, ApiError> {
    Ok(Json(state.db.stats.collect().await?))
}
