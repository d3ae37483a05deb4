//! Site announcements.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use mindforge_core::{Announcement, Page};

use super::PageQuery;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct AnnouncementBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("announcement {id} not found"))
}

pub async fn create_announcement(
    State(state): State<AppState>,
    Json(body): Json<AnnouncementBody>,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    let announcement = state
        .db
        .announcements
        .create(body.title.trim(), &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    Ok(Json(state.db.announcements.list_all().await?))
}

pub async fn list_announcements_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Announcement>>, ApiError> {
    Ok(Json(state.db.announcements.list_page(query.request()).await?))
}

pub async fn search_announcements(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    Ok(Json(
        state
            .db
            .announcements
            .search_by_title(query.title.trim())
            .await?,
    ))
}

pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Announcement>, ApiError> {
    let announcement = state
        .db
        .announcements
        .get(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(announcement))
}

pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AnnouncementBody>,
) -> Result<Json<Announcement>, ApiError> {
    let announcement = state
        .db
        .announcements
        .update(id, body.title.trim(), &body.content)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(announcement))
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.announcements.delete(id).await? {
        return Err(not_found(id));
    }
    Ok(Json(json!({ "success": true })))
}
