//! AnythingLLM developer API client.
//!
//! Workspaces mirror notebooks; documents mirror sources. Every call carries
//! `Authorization: Bearer {api_key}`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use mindforge_core::{
    defaults, ChatHistoryQuery, Error, Result, UploadedDocument, Workspace, WorkspaceBackend,
    WorkspaceChatRequest, WorkspaceChatResponse,
};

/// Chats slower than this are logged as slow.
const SLOW_CHAT_MS: u64 = 30_000;

/// Connection settings for the AnythingLLM API.
#[derive(Debug, Clone)]
pub struct AnythingLlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for AnythingLlmConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::ANYTHINGLLM_URL.to_string(),
            api_key: String::new(),
            timeout_secs: defaults::ANYTHINGLLM_TIMEOUT_SECS,
        }
    }
}

impl AnythingLlmConfig {
    /// Read `ANYTHINGLLM_URL`, `ANYTHINGLLM_API_KEY` and `ANYTHINGLLM_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ANYTHINGLLM_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("ANYTHINGLLM_API_KEY").unwrap_or(defaults.api_key),
            timeout_secs: std::env::var("ANYTHINGLLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewWorkspaceResponse {
    workspace: Option<Workspace>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    documents: Vec<UploadedDocument>,
}

/// AnythingLLM workspace backend.
pub struct AnythingLlmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AnythingLlmClient {
    pub fn new(config: AnythingLlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        if config.api_key.is_empty() {
            warn!(
                subsystem = "inference",
                component = "anythingllm",
                "ANYTHINGLLM_API_KEY is empty; remote calls will be rejected"
            );
        }
        info!(
            subsystem = "inference",
            component = "anythingllm",
            url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "Initializing AnythingLLM client"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(AnythingLlmConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// URL below `/api/v1/workspace/{slug}`. The slug comes from clients, so
    /// anything that is not a single plain segment is refused.
    fn workspace_url(&self, slug: &str, tail: &str) -> Result<String> {
        if !Workspace::is_valid_slug(slug) {
            return Err(Error::InvalidInput(format!("invalid workspace slug: {slug:?}")));
        }
        Ok(self.url(&format!("/workspace/{slug}{tail}")))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, op: &str, builder: RequestBuilder) -> Result<Response> {
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("AnythingLLM {op} request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "AnythingLLM {op} returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn first_document(&self, op: &str, response: Response) -> Result<UploadedDocument> {
        let body: DocumentsResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse AnythingLLM {op} response: {e}")))?;

        if body.success == Some(false) {
            return Err(Error::Upstream(format!(
                "AnythingLLM {op} failed: {}",
                body.error.unwrap_or_default()
            )));
        }
        body.documents
            .into_iter()
            .next()
            .ok_or_else(|| Error::Upstream(format!("AnythingLLM {op} returned no document")))
    }
}

#[async_trait]
impl WorkspaceBackend for AnythingLlmClient {
    #[instrument(skip(self), fields(subsystem = "inference", component = "anythingllm", op = "create_workspace"))]
    async fn create_workspace(&self, name: &str) -> Result<Workspace> {
        let response = self
            .send(
                "create_workspace",
                self.client
                    .post(self.url("/workspace/new"))
                    .json(&json!({ "name": name })),
            )
            .await?;

        let body: NewWorkspaceResponse = response.json().await.map_err(|e| {
            Error::Upstream(format!("Failed to parse AnythingLLM workspace response: {e}"))
        })?;

        let workspace = body.workspace.ok_or_else(|| {
            Error::Upstream(format!(
                "AnythingLLM did not create a workspace: {}",
                body.message.unwrap_or_default()
            ))
        })?;
        if !Workspace::is_valid_slug(&workspace.slug) {
            return Err(Error::Upstream(format!(
                "AnythingLLM returned an unusable slug: {:?}",
                workspace.slug
            )));
        }
        debug!(slug = %workspace.slug, "Workspace created");
        Ok(workspace)
    }

    #[instrument(skip(self), fields(subsystem = "inference", component = "anythingllm", op = "rename_workspace"))]
    async fn rename_workspace(&self, slug: &str, name: &str) -> Result<()> {
        self.send(
            "rename_workspace",
            self.client
                .post(self.workspace_url(slug, "/update")?)
                .json(&json!({ "name": name })),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "inference", component = "anythingllm", op = "delete_workspace"))]
    async fn delete_workspace(&self, slug: &str) -> Result<()> {
        self.send(
            "delete_workspace",
            self.client.delete(self.workspace_url(slug, "")?),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, data), fields(subsystem = "inference", component = "anythingllm", op = "upload_document", size = data.len()))]
    async fn upload_document(&self, file_name: &str, data: Vec<u8>) -> Result<UploadedDocument> {
        let part = Part::bytes(data).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .send(
                "upload_document",
                self.client.post(self.url("/document/upload")).multipart(form),
            )
            .await?;
        self.first_document("upload_document", response).await
    }

    #[instrument(skip(self, text), fields(subsystem = "inference", component = "anythingllm", op = "upload_raw_text", text_len = text.len()))]
    async fn upload_raw_text(&self, title: &str, text: &str) -> Result<UploadedDocument> {
        let response = self
            .send(
                "upload_raw_text",
                self.client.post(self.url("/document/raw-text")).json(&json!({
                    "textContent": text,
                    "metadata": { "title": title },
                })),
            )
            .await?;
        self.first_document("upload_raw_text", response).await
    }

    #[instrument(skip(self, locations), fields(subsystem = "inference", component = "anythingllm", op = "embed_documents", count = locations.len()))]
    async fn embed_documents(&self, slug: &str, locations: &[String]) -> Result<()> {
        self.send(
            "embed_documents",
            self.client
                .post(self.workspace_url(slug, "/update-embeddings")?)
                .json(&json!({ "adds": locations, "deletes": [] })),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, req), fields(subsystem = "inference", component = "anythingllm", op = "chat", prompt_len = req.message.len()))]
    async fn chat(&self, slug: &str, req: &WorkspaceChatRequest) -> Result<WorkspaceChatResponse> {
        let start = Instant::now();
        let response = self
            .send(
                "chat",
                self.client
                    .post(self.workspace_url(slug, "/chat")?)
                    .json(req),
            )
            .await?;

        let reply: WorkspaceChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse AnythingLLM chat response: {e}")))?;

        if let Some(reason) = reply.abort_reason() {
            return Err(Error::Upstream(format!("AnythingLLM chat aborted: {reason}")));
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = reply.text_response.as_deref().map_or(0, str::len),
            duration_ms = elapsed,
            "Workspace chat complete"
        );
        if elapsed > SLOW_CHAT_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow workspace chat");
        }
        Ok(reply)
    }

    #[instrument(skip(self, query), fields(subsystem = "inference", component = "anythingllm", op = "chat_history"))]
    async fn chat_history(&self, slug: &str, query: &ChatHistoryQuery) -> Result<serde_json::Value> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(order_by) = &query.order_by {
            params.push(("orderBy", order_by.clone()));
        }
        if let Some(session) = &query.api_session_id {
            params.push(("apiSessionId", session.clone()));
        }

        let response = self
            .send(
                "chat_history",
                self.client
                    .get(self.workspace_url(slug, "/chats")?)
                    .query(&params),
            )
            .await?;

        let body: serde_json::Value = response.json().await.map_err(|e| {
            Error::Upstream(format!("Failed to parse AnythingLLM history response: {e}"))
        })?;
        Ok(body)
    }
}
