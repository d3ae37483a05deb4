//! Notebook repository implementation.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};
use tracing::info;

use mindforge_core::{Error, Notebook, NotebookRepository, Result};

const NOTEBOOK_COLUMNS: &str = "id, user_id, title, slug, source_count, created_at";

/// MySQL implementation of NotebookRepository.
pub struct MySqlNotebookRepository {
    pool: Pool<MySql>,
}

impl MySqlNotebookRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_notebook(r: MySqlRow) -> Notebook {
    Notebook {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        slug: r.get("slug"),
        source_count: r.get("source_count"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl NotebookRepository for MySqlNotebookRepository {
    async fn insert(&self, user_id: i64, title: &str, slug: &str) -> Result<Notebook> {
        let result =
            sqlx::query("INSERT INTO notebooks (user_id, title, slug, source_count) VALUES (?, ?, ?, 0)")
                .bind(user_id)
                .bind(title)
                .bind(slug)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;

        let id = result.last_insert_id() as i64;
        self.get_for_user(user_id, id)
            .await?
            .ok_or_else(|| Error::Internal(format!("notebook {id} missing after insert")))
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notebook>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_notebook).collect())
    }

    async fn get_for_user(&self, user_id: i64, id: i64) -> Result<Option<Notebook>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_notebook))
    }

    async fn get_by_slug_for_user(&self, user_id: i64, slug: &str) -> Result<Option<Notebook>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE slug = ? AND user_id = ? LIMIT 1"
        ))
        .bind(slug)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_notebook))
    }

    async fn rename(&self, user_id: i64, id: i64, title: &str) -> Result<Option<Notebook>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let current = sqlx::query(&format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE id = ? AND user_id = ? FOR UPDATE"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .map(map_notebook);

        let Some(mut notebook) = current else {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(None);
        };

        sqlx::query("UPDATE notebooks SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        for table in ["sources", "notes"] {
            sqlx::query(&format!(
                "UPDATE {table} SET folder_name = ? WHERE user_id = ? AND folder_name = ?"
            ))
            .bind(title)
            .bind(user_id)
            .bind(&notebook.title)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            db_table = "notebooks",
            notebook_id = id,
            from = %notebook.title,
            to = %title,
            "Renamed notebook"
        );
        notebook.title = title.to_string();
        Ok(Some(notebook))
    }

    async fn delete_cascade(&self, user_id: i64, id: i64) -> Result<Option<Notebook>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let current = sqlx::query(&format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE id = ? AND user_id = ? FOR UPDATE"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .map(map_notebook);

        let Some(notebook) = current else {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(None);
        };

        let sources = sqlx::query("DELETE FROM sources WHERE user_id = ? AND folder_name = ?")
            .bind(user_id)
            .bind(&notebook.title)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        let notes = sqlx::query("DELETE FROM notes WHERE user_id = ? AND folder_name = ?")
            .bind(user_id)
            .bind(&notebook.title)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        sqlx::query("DELETE FROM notebooks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            db_table = "notebooks",
            notebook_id = id,
            sources,
            notes,
            "Deleted notebook with its sources and notes"
        );
        Ok(Some(notebook))
    }
}
