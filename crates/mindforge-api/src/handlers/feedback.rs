//! User feedback and data-URL uploads.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use mindforge_core::defaults;
use mindforge_db::storage_key;

use crate::middleware::AuthUser;
use crate::services::data_url;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBody {
    pub feedback: String,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub email_updates: bool,
}

#[derive(Debug, Deserialize)]
pub struct UploadBody {
    pub file: String,
    #[serde(default)]
    pub folder: Option<String>,
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<FeedbackBody>,
) -> Result<Json<Value>, ApiError> {
    if body.feedback.trim().is_empty() {
        return Err(ApiError::BadRequest("feedback is required".to_string()));
    }

    let screenshot_url = match body.screenshot.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(screenshot) => {
            let blob = data_url::decode(screenshot)?;
            let key = format!("{}/{}.png", defaults::FEEDBACK_SCREENSHOTS_PREFIX, Uuid::new_v4());
            Some(state.storage.put(&key, &blob.data).await?)
        }
        None => None,
    };

    state
        .db
        .feedback
        .create(
            user.id(),
            body.feedback.trim(),
            screenshot_url.as_deref(),
            body.email_updates,
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/upload-to-oss`: store any data-URL blob, return its URL.
pub async fn upload_blob(
    State(state): State<AppState>,
    Json(body): Json<UploadBody>,
) -> Result<Json<Value>, ApiError> {
    let blob = data_url::decode(&body.file)?;
    let folder = body
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(defaults::UPLOADS_PREFIX);
    let key = storage_key(folder, &format!("upload.{}", blob.extension()));

    let url = state.storage.put(&key, &blob.data).await?;
    Ok(Json(json!({ "url": url })))
}
