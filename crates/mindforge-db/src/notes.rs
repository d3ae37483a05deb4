//! Note repository implementation.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row, Transaction};
use tracing::info;

use mindforge_core::{
    CreateNoteRequest, CreateSourceRequest, Error, ImportedBundle, Note, NoteDraft,
    NoteRepository, Result, SourceDraft,
};

use crate::sources::insert_source_tx;

const NOTE_COLUMNS: &str = "id, user_id, title, content, folder_name, created_at";

/// MySQL implementation of NoteRepository.
pub struct MySqlNoteRepository {
    pool: Pool<MySql>,
}

impl MySqlNoteRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

fn map_note(r: MySqlRow) -> Note {
    Note {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        content: r.get("content"),
        folder_name: r.get("folder_name"),
        created_at: r.get("created_at"),
    }
}

async fn insert_note_tx(tx: &mut Transaction<'_, MySql>, req: &CreateNoteRequest) -> Result<Note> {
    let result =
        sqlx::query("INSERT INTO notes (user_id, title, content, folder_name) VALUES (?, ?, ?, ?)")
            .bind(req.user_id)
            .bind(&req.title)
            .bind(&req.content)
            .bind(&req.folder_name)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

    let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"))
        .bind(result.last_insert_id() as i64)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

    Ok(map_note(row))
}

#[async_trait]
impl NoteRepository for MySqlNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = insert_note_tx(&mut tx, &req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }

    async fn list_for_user(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Note>> {
        let rows = match folder_name {
            Some(folder) => sqlx::query(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? AND folder_name = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(user_id)
            .bind(folder)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?,
            None => sqlx::query(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?,
        };

        Ok(rows.into_iter().map(map_note).collect())
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Note>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owned = sqlx::query("SELECT id FROM notes WHERE id = ? AND user_id = ? FOR UPDATE")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?
            .is_some();
        if !owned {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(None);
        }

        sqlx::query("UPDATE notes SET title = ?, content = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(Some(map_note(row)))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn import_bundle(
        &self,
        user_id: i64,
        folder_name: &str,
        notes: &[NoteDraft],
        sources: &[SourceDraft],
    ) -> Result<ImportedBundle> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut bundle = ImportedBundle::default();

        for draft in notes {
            let req = CreateNoteRequest {
                user_id,
                title: draft.title.clone(),
                content: draft.content.clone(),
                folder_name: folder_name.to_string(),
            };
            bundle.notes.push(insert_note_tx(&mut tx, &req).await?);
        }

        for draft in sources {
            let req = CreateSourceRequest {
                user_id,
                file_name: draft.file_name.clone(),
                file_url: draft.file_url.clone(),
                folder_name: folder_name.to_string(),
                location: draft.location.clone(),
            };
            bundle.sources.push(insert_source_tx(&mut tx, &req).await?);
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            db_table = "notes",
            user_id,
            folder = %folder_name,
            notes = bundle.notes.len(),
            sources = bundle.sources.len(),
            "Imported notebook bundle"
        );
        Ok(bundle)
    }
}
