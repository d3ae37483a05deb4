//! Notebook CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use mindforge_core::Notebook;

use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct NotebookBody {
    #[serde(default)]
    pub title: String,
}

pub async fn create_notebook(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<NotebookBody>,
) -> Result<(StatusCode, Json<Notebook>), ApiError> {
    let notebook = state.notebooks.create(user.id(), &body.title).await?;
    Ok((StatusCode::CREATED, Json(notebook)))
}

pub async fn list_notebooks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Notebook>>, ApiError> {
    Ok(Json(state.notebooks.list(user.id()).await?))
}

pub async fn get_notebook(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Notebook>, ApiError> {
    Ok(Json(state.notebooks.get(user.id(), id).await?))
}

pub async fn rename_notebook(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<NotebookBody>,
) -> Result<Json<Notebook>, ApiError> {
    Ok(Json(state.notebooks.rename(user.id(), id, &body.title).await?))
}

pub async fn delete_notebook(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Notebook>, ApiError> {
    Ok(Json(state.notebooks.delete(user.id(), id).await?))
}
