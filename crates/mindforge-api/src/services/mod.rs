//! Service layer for business logic.

pub mod auth_service;
pub mod chat_service;
pub mod data_url;
pub mod note_service;
pub mod notebook_service;
pub mod source_service;
pub mod token_cache;

#[cfg(test)]
pub(crate) mod testing;

pub use auth_service::{AuthService, AuthToken};
pub use chat_service::ChatService;
pub use note_service::NoteService;
pub use notebook_service::NotebookService;
pub use source_service::{SourceCreated, SourceService, SourceUpload};
pub use token_cache::TokenCache;
