//! Notes, generated notes and notebook import.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use mindforge_core::{Note, NoteDraft, NoteKind, SourceDraft};

use super::sources::FolderQuery;
use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub folder_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateNoteBody {
    #[serde(default)]
    pub slug: String,
    /// Parsed into [`NoteKind`] by the handler so an unknown value is a 400.
    #[serde(default, alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub folder_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBody {
    pub library_name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteDraft>,
    #[serde(default)]
    pub sources: Vec<SourceDraft>,
    #[serde(default)]
    pub messages: Vec<Value>,
}

pub async fn create_note(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateNoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state
        .notes
        .create(
            user.id(),
            &body.title,
            &body.content,
            body.folder_name.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_notes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<FolderQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(
        state
            .notes
            .list(user.id(), query.folder_name.as_deref())
            .await?,
    ))
}

pub async fn update_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(
        state
            .notes
            .update(user.id(), id, &body.title, &body.content)
            .await?,
    ))
}

pub async fn delete_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.notes.delete(user.id(), id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn generate_note(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<GenerateNoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let kind: NoteKind = body.kind.parse()?;
    let note = state
        .notes
        .generate(
            user.id(),
            &body.slug,
            kind,
            body.folder_name.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Persist an exported notebook. Chat messages are not stored; they are
/// echoed so the client can restore its view.
pub async fn import_notebook(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ImportBody>,
) -> Result<Json<Value>, ApiError> {
    let bundle = state
        .notes
        .import(user.id(), &body.library_name, &body.notes, &body.sources)
        .await?;
    Ok(Json(json!({
        "libraryName": body.library_name.trim(),
        "slug": body.slug,
        "notes": bundle.notes,
        "sources": bundle.sources,
        "messages": body.messages,
    })))
}
