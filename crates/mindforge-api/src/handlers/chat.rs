//! Chat proxy routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use mindforge_core::{ChatHistoryQuery, ChatTurn, WorkspaceChatResponse};

use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<Value>,
    #[serde(default)]
    pub attachments: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyChatBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<Value>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Clients send conversation ids as strings or as millisecond timestamps.
fn conversation_key(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub async fn chat(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ChatBody>,
) -> Result<Json<WorkspaceChatResponse>, ApiError> {
    let reply = state
        .chat
        .chat(
            user.id(),
            &body.slug,
            &body.message,
            body.mode.as_deref(),
            conversation_key(body.conversation_id),
            body.attachments,
        )
        .await?;
    Ok(Json(reply))
}

pub async fn simple_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ChatBody>,
) -> Result<Json<Value>, ApiError> {
    let text = state
        .chat
        .simple(user.id(), &body.slug, &body.message, body.mode.as_deref())
        .await?;
    Ok(Json(json!({ "textResponse": text })))
}

pub async fn chat_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Query(query): Query<ChatHistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state.chat.history(user.id(), &slug, &query).await?;
    let history = body.get("history").cloned().unwrap_or_else(|| json!([]));
    Ok(Json(json!({ "history": history })))
}

pub async fn legacy_chat(
    State(state): State<AppState>,
    Json(body): Json<LegacyChatBody>,
) -> Result<Json<Value>, ApiError> {
    let conversation_id = conversation_key(body.conversation_id);
    let response = state
        .chat
        .legacy(conversation_id.as_deref(), &body.history, &body.message)
        .await?;
    Ok(Json(json!({ "response": response })))
}
