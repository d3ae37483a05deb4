//! Notes, generated notes and notebook imports.

use std::sync::Arc;

use tracing::info;

use mindforge_core::{
    defaults, CreateNoteRequest, Error, ImportedBundle, Note, NoteDraft, NoteKind,
    NoteRepository, NotebookRepository, Result, SourceDraft, WorkspaceBackend,
    WorkspaceChatRequest,
};

use super::notebook_service::owned_slug;

#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    notebooks: Arc<dyn NotebookRepository>,
    workspace: Arc<dyn WorkspaceBackend>,
}

fn folder_or_default(folder_name: Option<&str>) -> String {
    folder_name
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(defaults::DEFAULT_FOLDER)
        .to_string()
}

impl NoteService {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        notebooks: Arc<dyn NotebookRepository>,
        workspace: Arc<dyn WorkspaceBackend>,
    ) -> Self {
        Self {
            notes,
            notebooks,
            workspace,
        }
    }

    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
        content: &str,
        folder_name: Option<&str>,
    ) -> Result<Note> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("note title is required".to_string()));
        }
        self.notes
            .insert(CreateNoteRequest {
                user_id,
                title: title.trim().to_string(),
                content: content.to_string(),
                folder_name: folder_or_default(folder_name),
            })
            .await
    }

    pub async fn list(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Note>> {
        let folder = folder_name.map(str::trim).filter(|f| !f.is_empty());
        self.notes.list_for_user(user_id, folder).await
    }

    pub async fn update(&self, user_id: i64, id: i64, title: &str, content: &str) -> Result<Note> {
        self.notes
            .update(user_id, id, title, content)
            .await?
            .ok_or_else(|| Error::NotFound(format!("note {id} not found")))
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<()> {
        if !self.notes.delete(user_id, id).await? {
            return Err(Error::NotFound(format!("note {id} not found")));
        }
        Ok(())
    }

    /// Ask the caller's notebook workspace for a preset document and save it
    /// as a note.
    pub async fn generate(
        &self,
        user_id: i64,
        slug: &str,
        kind: NoteKind,
        folder_name: Option<&str>,
    ) -> Result<Note> {
        let slug = owned_slug(self.notebooks.as_ref(), user_id, slug).await?;

        let request = WorkspaceChatRequest {
            message: kind.prompt().to_string(),
            mode: defaults::CHAT_MODE.to_string(),
            session_id: None,
            attachments: Vec::new(),
        };
        let reply = self.workspace.chat(slug, &request).await?;
        let content = reply
            .text_response
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Upstream("workspace chat returned no text".to_string()))?;

        let note = self
            .notes
            .insert(CreateNoteRequest {
                user_id,
                title: kind.title().to_string(),
                content,
                folder_name: folder_or_default(folder_name),
            })
            .await?;
        info!(
            subsystem = "api",
            component = "notes",
            user_id,
            note_id = note.id,
            kind = ?kind,
            "Generated note saved"
        );
        Ok(note)
    }

    pub async fn import(
        &self,
        user_id: i64,
        folder_name: &str,
        notes: &[NoteDraft],
        sources: &[SourceDraft],
    ) -> Result<ImportedBundle> {
        let folder = folder_name.trim();
        if folder.is_empty() {
            return Err(Error::InvalidInput("libraryName is required".to_string()));
        }
        self.notes
            .import_bundle(user_id, folder, notes, sources)
            .await
    }
}
