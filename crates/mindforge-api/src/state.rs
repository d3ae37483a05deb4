//! Shared application state.

use std::sync::Arc;

use mindforge_core::{GenerationBackend, StorageBackend, WorkspaceBackend};
use mindforge_db::Database;
use mindforge_inference::ConversationStore;

use crate::auth::JwtKeys;
use crate::services::{
    AuthService, ChatService, NoteService, NotebookService, SourceService, TokenCache,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repositories for the tables handled without a service (forum,
    /// announcements, feedback, calendar, stats).
    pub db: Database,
    pub storage: Arc<dyn StorageBackend>,
    pub jwt: JwtKeys,
    pub auth: AuthService,
    pub notebooks: NotebookService,
    pub sources: SourceService,
    pub notes: NoteService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        db: Database,
        workspace: Arc<dyn WorkspaceBackend>,
        generator: Arc<dyn GenerationBackend>,
        storage: Arc<dyn StorageBackend>,
        jwt: JwtKeys,
        tokens: TokenCache,
        conversations: Arc<ConversationStore>,
    ) -> Self {
        Self {
            auth: AuthService::new(db.users.clone(), storage.clone(), jwt.clone(), tokens),
            notebooks: NotebookService::new(db.notebooks.clone(), workspace.clone()),
            sources: SourceService::new(
                db.sources.clone(),
                db.notebooks.clone(),
                workspace.clone(),
                storage.clone(),
            ),
            notes: NoteService::new(db.notes.clone(), db.notebooks.clone(), workspace.clone()),
            chat: ChatService::new(db.notebooks.clone(), workspace, generator, conversations),
            db,
            storage,
            jwt,
        }
    }
}
