//! Forum posts and comments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use mindforge_core::{ForumComment, ForumPost, Page};

use super::PageQuery;
use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub post_id: i64,
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize)]
pub struct CommentUpdateBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    pub email: String,
}

fn post_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("post {id} not found"))
}

fn comment_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("comment {id} not found"))
}

fn non_empty<'a>(value: &'a str, name: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{name} is required")));
    }
    Ok(trimmed)
}

// ---- posts -----------------------------------------------------------------

pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<PostBody>,
) -> Result<(StatusCode, Json<ForumPost>), ApiError> {
    let title = non_empty(&body.title, "title")?;
    let author = state.auth.user(user.id()).await?;
    let post = state
        .db
        .posts
        .create(title, &body.content, body.image_url.as_deref(), &author.email)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<ForumPost>>, ApiError> {
    Ok(Json(state.db.posts.list_all().await?))
}

pub async fn list_posts_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ForumPost>>, ApiError> {
    Ok(Json(state.db.posts.list_page(query.request()).await?))
}

pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<AuthorQuery>,
) -> Result<Json<Vec<ForumPost>>, ApiError> {
    Ok(Json(state.db.posts.search_by_author(query.email.trim()).await?))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ForumPost>, ApiError> {
    let post = state.db.posts.get(id).await?.ok_or_else(|| post_not_found(id))?;
    Ok(Json(post))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PostBody>,
) -> Result<Json<ForumPost>, ApiError> {
    let title = non_empty(&body.title, "title")?;
    let post = state
        .db
        .posts
        .update(id, title, &body.content, body.image_url.as_deref())
        .await?
        .ok_or_else(|| post_not_found(id))?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.posts.delete(id).await? {
        return Err(post_not_found(id));
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn like_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ForumPost>, ApiError> {
    let post = state.db.posts.like(id).await?.ok_or_else(|| post_not_found(id))?;
    Ok(Json(post))
}

pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ForumComment>>, ApiError> {
    Ok(Json(state.db.comments.list_for_post(id).await?))
}

// ---- comments --------------------------------------------------------------

/// The author's email is stored even for anonymous comments; `is_anonymous`
/// only controls display.
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<ForumComment>), ApiError> {
    let content = non_empty(&body.content, "content")?;
    let author = state.auth.user(user.id()).await?;
    let comment = state
        .db
        .comments
        .create(body.post_id, content, body.is_anonymous, Some(&author.email))
        .await?
        .ok_or_else(|| post_not_found(body.post_id))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<AppState>,
) -> Result<Json<Vec<ForumComment>>, ApiError> {
    Ok(Json(state.db.comments.list_all().await?))
}

pub async fn list_comments_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ForumComment>>, ApiError> {
    Ok(Json(state.db.comments.list_page(query.request()).await?))
}

pub async fn search_comments(
    State(state): State<AppState>,
    Query(query): Query<AuthorQuery>,
) -> Result<Json<Vec<ForumComment>>, ApiError> {
    Ok(Json(state.db.comments.search_by_email(query.email.trim()).await?))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CommentUpdateBody>,
) -> Result<Json<ForumComment>, ApiError> {
    let content = non_empty(&body.content, "content")?;
    let comment = state
        .db
        .comments
        .update(id, content)
        .await?
        .ok_or_else(|| comment_not_found(id))?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.comments.delete(id).await? {
        return Err(comment_not_found(id));
    }
    Ok(Json(json!({ "success": true })))
}
