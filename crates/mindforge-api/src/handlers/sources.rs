//! Source upload and listing.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use mindforge_core::Source;

use super::FormParts;
use crate::middleware::AuthUser;
use crate::services::{SourceCreated, SourceUpload};
use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderQuery {
    pub folder_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertNoteBody {
    pub file_name: String,
    pub file_content: String,
    #[serde(default, alias = "libraryName")]
    pub folder_name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// `POST /api/sources/upload`: multipart `file` plus `fileName`,
/// `libraryName` (or `folderName`) and an optional `slug`.
pub async fn upload_source(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SourceCreated>), ApiError> {
    let mut form = FormParts::read(multipart).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;

    let upload = SourceUpload {
        user_id: user.id(),
        file_name: form
            .field("fileName")
            .map(str::to_string)
            .unwrap_or(file.file_name),
        folder_name: form
            .field("libraryName")
            .or_else(|| form.field("folderName"))
            .unwrap_or_default()
            .to_string(),
        slug: form.field("slug").map(str::to_string),
        data: file.data,
    };

    let created = state.sources.upload(upload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_sources(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<FolderQuery>,
) -> Result<Json<Vec<Source>>, ApiError> {
    Ok(Json(
        state
            .sources
            .list(user.id(), query.folder_name.as_deref())
            .await?,
    ))
}

pub async fn convert_note(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ConvertNoteBody>,
) -> Result<(StatusCode, Json<SourceCreated>), ApiError> {
    let created = state
        .sources
        .convert_note(
            user.id(),
            &body.file_name,
            &body.file_content,
            &body.folder_name,
            body.slug.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
