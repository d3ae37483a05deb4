//! Core traits for MindForge abstractions.
//!
//! The services in `mindforge-api` talk to storage and remote services only
//! through these traits, so they can be exercised with in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;
use crate::pagination::{Page, PageRequest};

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate email surfaces as a database error
    /// for which [`crate::Error::is_duplicate_key`] is true.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<i64>;

    /// Public view of a user.
    async fn get(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>>;

    async fn credentials_by_id(&self, id: i64) -> Result<Option<UserCredentials>>;

    /// Returns false when no row matched.
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool>;

    async fn update_password_by_email(&self, email: &str, password_hash: &str) -> Result<bool>;

    async fn update_avatar(&self, id: i64, avatar_url: &str) -> Result<bool>;

    async fn update_email(&self, id: i64, email: &str) -> Result<bool>;

    async fn list_page(&self, req: PageRequest) -> Result<Page<User>>;

    /// Delete the user with their notes, sources and notebooks in one
    /// transaction. Returns false (and rolls back) when the user is missing.
    async fn delete_cascade(&self, id: i64) -> Result<bool>;
}

/// Repository for notebooks. Every operation is scoped to the owner.
#[async_trait]
pub trait NotebookRepository: Send + Sync {
    async fn insert(&self, user_id: i64, title: &str, slug: &str) -> Result<Notebook>;

    /// Newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notebook>>;

    async fn get_for_user(&self, user_id: i64, id: i64) -> Result<Option<Notebook>>;

    /// The caller's notebook bound to a workspace slug.
    async fn get_by_slug_for_user(&self, user_id: i64, slug: &str) -> Result<Option<Notebook>>;

    /// Rename the notebook and the `folder_name` of its sources and notes in
    /// one transaction. Returns the renamed notebook, or `None` if not owned.
    async fn rename(&self, user_id: i64, id: i64, title: &str) -> Result<Option<Notebook>>;

    /// Delete the notebook with its sources and notes in one transaction.
    /// Returns the deleted row, or `None` if not owned.
    async fn delete_cascade(&self, user_id: i64, id: i64) -> Result<Option<Notebook>>;
}

/// Repository for uploaded sources.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Insert the row and bump the owning notebook's `source_count` in one
    /// transaction.
    async fn insert(&self, req: CreateSourceRequest) -> Result<Source>;

    /// Newest first, optionally restricted to one folder.
    async fn list_for_user(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Source>>;
}

/// Repository for notes. Every operation is scoped to the owner.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Newest first, optionally restricted to one folder.
    async fn list_for_user(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Note>>;

    async fn update(&self, user_id: i64, id: i64, title: &str, content: &str)
        -> Result<Option<Note>>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool>;

    /// Persist imported notes and sources in one transaction.
    async fn import_bundle(
        &self,
        user_id: i64,
        folder_name: &str,
        notes: &[NoteDraft],
        sources: &[SourceDraft],
    ) -> Result<ImportedBundle>;
}

// =============================================================================
// REMOTE BACKEND TRAITS
// =============================================================================

/// Remote workspace service (AnythingLLM): workspaces, documents, chat.
#[async_trait]
pub trait WorkspaceBackend: Send + Sync {
    async fn create_workspace(&self, name: &str) -> Result<Workspace>;

    async fn rename_workspace(&self, slug: &str, name: &str) -> Result<()>;

    async fn delete_workspace(&self, slug: &str) -> Result<()>;

    /// Upload a file for ingestion. Returns the document location.
    async fn upload_document(&self, file_name: &str, data: Vec<u8>) -> Result<UploadedDocument>;

    /// Ingest plain text as a document. Returns the document location.
    async fn upload_raw_text(&self, title: &str, text: &str) -> Result<UploadedDocument>;

    /// Add documents to a workspace's embeddings.
    async fn embed_documents(&self, slug: &str, locations: &[String]) -> Result<()>;

    async fn chat(&self, slug: &str, req: &WorkspaceChatRequest) -> Result<WorkspaceChatResponse>;

    async fn chat_history(&self, slug: &str, query: &ChatHistoryQuery)
        -> Result<serde_json::Value>;
}

/// Backend for text generation (legacy chat).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for a fully built prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Blob storage for uploaded files. Stored blobs are read back by clients
/// through the returned public URL.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data under `key` and return its public URL.
    async fn put(&self, key: &str, data: &[u8]) -> Result<String>;
}
