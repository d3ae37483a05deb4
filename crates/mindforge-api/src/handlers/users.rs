//! The caller's own account: password, avatar, email.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::FormParts;
use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmailBody {
    pub email: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ChangePasswordBody>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .change_password(user.id(), &body.old_password, &body.new_password)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/user/avatar` with a multipart `avatar` file.
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut form = FormParts::read(multipart).await?;
    let avatar = form
        .take_file("avatar")
        .ok_or_else(|| ApiError::BadRequest("avatar file is required".to_string()))?;

    let avatar_url = state
        .auth
        .update_avatar(user.id(), &avatar.file_name, &avatar.data)
        .await?;
    Ok(Json(json!({ "avatarUrl": avatar_url })))
}

pub async fn get_avatar(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let avatar_url = state.auth.avatar(user.id()).await?;
    Ok(Json(json!({ "avatarUrl": avatar_url })))
}

pub async fn update_email(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<UpdateEmailBody>,
) -> Result<Json<Value>, ApiError> {
    state.auth.update_email(user.id(), &body.email).await?;
    Ok(Json(json!({ "success": true, "email": body.email.trim() })))
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<mindforge_core::User>, ApiError> {
    Ok(Json(state.auth.user(user.id()).await?))
}
