//! Chat: AnythingLLM workspace proxy and the legacy Ollama conversation path.

use std::sync::Arc;

use tracing::debug;

use mindforge_core::{
    defaults, ChatHistoryQuery, ChatTurn, Error, GenerationBackend, NotebookRepository, Result,
    WorkspaceBackend, WorkspaceChatRequest, WorkspaceChatResponse,
};
use mindforge_inference::{build_prompt, ConversationStore};

use super::notebook_service::owned_slug;

#[derive(Clone)]
pub struct ChatService {
    notebooks: Arc<dyn NotebookRepository>,
    workspace: Arc<dyn WorkspaceBackend>,
    generator: Arc<dyn GenerationBackend>,
    conversations: Arc<ConversationStore>,
}

fn required<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{name} is required")));
    }
    Ok(trimmed)
}

impl ChatService {
    pub fn new(
        notebooks: Arc<dyn NotebookRepository>,
        workspace: Arc<dyn WorkspaceBackend>,
        generator: Arc<dyn GenerationBackend>,
        conversations: Arc<ConversationStore>,
    ) -> Self {
        Self {
            notebooks,
            workspace,
            generator,
            conversations,
        }
    }

    pub fn conversations(&self) -> &Arc<ConversationStore> {
        &self.conversations
    }

    /// Forward a message to the caller's notebook workspace. `conversation_id`
    /// becomes the AnythingLLM session id.
    pub async fn chat(
        &self,
        user_id: i64,
        slug: &str,
        message: &str,
        mode: Option<&str>,
        conversation_id: Option<String>,
        attachments: Vec<serde_json::Value>,
    ) -> Result<WorkspaceChatResponse> {
        if message.trim().is_empty() {
            return Err(Error::InvalidInput("message is required".to_string()));
        }
        let slug = owned_slug(self.notebooks.as_ref(), user_id, slug).await?;

        let request = WorkspaceChatRequest {
            message: message.to_string(),
            mode: mode
                .filter(|m| !m.is_empty())
                .unwrap_or(defaults::CHAT_MODE)
                .to_string(),
            session_id: conversation_id.filter(|c| !c.is_empty()),
            attachments,
        };
        self.workspace.chat(slug, &request).await
    }

    /// Sessionless chat returning only the reply text.
    pub async fn simple(
        &self,
        user_id: i64,
        slug: &str,
        message: &str,
        mode: Option<&str>,
    ) -> Result<String> {
        let reply = self
            .chat(user_id, slug, message, mode, None, Vec::new())
            .await?;
        Ok(reply.text_response.unwrap_or_default())
    }

    pub async fn history(
        &self,
        user_id: i64,
        slug: &str,
        query: &ChatHistoryQuery,
    ) -> Result<serde_json::Value> {
        let slug = owned_slug(self.notebooks.as_ref(), user_id, slug).await?;
        self.workspace.chat_history(slug, query).await
    }

    /// Legacy chat against Ollama. Client-supplied history wins; without it
    /// the server-side history of the conversation is used.
    pub async fn legacy(
        &self,
        conversation_id: Option<&str>,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String> {
        let message = required(message, "message")?;
        let conversation_id = conversation_id.map(str::trim).filter(|c| !c.is_empty());

        let stored;
        let turns = match (history.is_empty(), conversation_id) {
            (true, Some(id)) => {
                stored = self.conversations.history(id);
                stored.as_slice()
            }
            _ => history,
        };

        let prompt = build_prompt(turns, message);
        debug!(
            model = self.generator.model_name(),
            turns = turns.len(),
            prompt_len = prompt.len(),
            "Legacy chat prompt built"
        );
        let reply = self.generator.generate(&prompt).await?;

        if let Some(id) = conversation_id {
            self.conversations.append_exchange(id, message, &reply);
        }
        Ok(reply)
    }
}
