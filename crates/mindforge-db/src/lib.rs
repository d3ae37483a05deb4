//! # mindforge-db
//!
//! MySQL database layer for the MindForge backend.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for every table
//! - Transactional cascades for notebook and user deletion
//! - Filesystem blob storage
//!
//! ## Example
//!
//! ```rust,ignore
//! use mindforge_db::{Database, NotebookRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("mysql://localhost/mindforge").await?;
//!     let notebooks = db.notebooks.list_for_user(1).await?;
//!     println!("{} notebooks", notebooks.len());
//!     Ok(())
//! }
//! ```
pub mod announcements;
pub mod calendar;
pub mod feedback;
pub mod file_storage;
pub mod forum;
pub mod notebooks;
pub mod notes;
pub mod pool;
pub mod sources;
pub mod stats;
pub mod users;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

use std::sync::Arc;

use sqlx::MySqlPool;

// Re-export core types
pub use mindforge_core::*;

pub use announcements::MySqlAnnouncementRepository;
pub use calendar::{MySqlEventRepository, MySqlPunchRepository};
pub use feedback::MySqlFeedbackRepository;
pub use file_storage::{storage_key, FilesystemBackend};
pub use forum::{MySqlForumCommentRepository, MySqlForumPostRepository};
pub use notebooks::MySqlNotebookRepository;
pub use notes::MySqlNoteRepository;
pub use pool::{create_lazy_pool, create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use sources::MySqlSourceRepository;
pub use stats::MySqlStatsRepository;
pub use users::MySqlUserRepository;

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
///
/// The repositories used by the services are behind `Arc` so they can be
/// handed out as trait objects.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: MySqlPool,
    pub users: Arc<MySqlUserRepository>,
    pub notebooks: Arc<MySqlNotebookRepository>,
    pub sources: Arc<MySqlSourceRepository>,
    pub notes: Arc<MySqlNoteRepository>,
    pub posts: Arc<MySqlForumPostRepository>,
    pub comments: Arc<MySqlForumCommentRepository>,
    pub announcements: Arc<MySqlAnnouncementRepository>,
    pub feedback: Arc<MySqlFeedbackRepository>,
    pub events: Arc<MySqlEventRepository>,
    pub punches: Arc<MySqlPunchRepository>,
    pub stats: Arc<MySqlStatsRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            users: Arc::new(MySqlUserRepository::new(pool.clone())),
            notebooks: Arc::new(MySqlNotebookRepository::new(pool.clone())),
            sources: Arc::new(MySqlSourceRepository::new(pool.clone())),
            notes: Arc::new(MySqlNoteRepository::new(pool.clone())),
            posts: Arc::new(MySqlForumPostRepository::new(pool.clone())),
            comments: Arc::new(MySqlForumCommentRepository::new(pool.clone())),
            announcements: Arc::new(MySqlAnnouncementRepository::new(pool.clone())),
            feedback: Arc::new(MySqlFeedbackRepository::new(pool.clone())),
            events: Arc::new(MySqlEventRepository::new(pool.clone())),
            punches: Arc::new(MySqlPunchRepository::new(pool.clone())),
            stats: Arc::new(MySqlStatsRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Create an instance whose pool connects on first use.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let pool = create_lazy_pool(url, PoolConfig::default())?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(escape_like("plain@example.com"), "plain@example.com");
    }
}
