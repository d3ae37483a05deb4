//! # mindforge-inference
//!
//! Remote model services for the MindForge backend.
//!
//! This crate provides:
//! - AnythingLLM client (workspaces, document ingestion, workspace chat)
//! - Ollama generation backend for the legacy chat path (feature `ollama`)
//! - In-memory conversation store with idle eviction
//!
//! # Example
//!
//! ```rust,no_run
//! use mindforge_inference::AnythingLlmClient;
//! use mindforge_core::WorkspaceBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AnythingLlmClient::from_env().unwrap();
//!     let workspace = client.create_workspace("Biology").await.unwrap();
//!     println!("{}", workspace.slug);
//! }
//! ```

pub mod anythingllm;
pub mod conversation;

#[cfg(feature = "ollama")]
pub mod ollama;

// Re-export core types
pub use mindforge_core::*;

pub use anythingllm::{AnythingLlmClient, AnythingLlmConfig};
pub use conversation::ConversationStore;

#[cfg(feature = "ollama")]
pub use ollama::{build_prompt, OllamaBackend};
