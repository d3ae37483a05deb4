//! # mindforge-core
//!
//! Core types, traits, and abstractions for the MindForge backend.
//!
//! This crate provides the domain models (users, notebooks, sources, notes and
//! the community tables), the repository and remote-backend traits the other
//! crates implement, and the shared error type.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use pagination::{Page, PageRequest};
pub use traits::*;
