//! Source repository implementation.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row, Transaction};

use mindforge_core::{CreateSourceRequest, Error, Result, Source, SourceRepository};

const SOURCE_COLUMNS: &str = "id, user_id, file_name, file_url, folder_name, location, created_at";

/// MySQL implementation of SourceRepository.
pub struct MySqlSourceRepository {
    pool: Pool<MySql>,
}

impl MySqlSourceRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_source(r: MySqlRow) -> Source {
    Source {
        id: r.get("id"),
        user_id: r.get("user_id"),
        file_name: r.get("file_name"),
        file_url: r.get("file_url"),
        folder_name: r.get("folder_name"),
        location: r.get("location"),
        created_at: r.get("created_at"),
    }
}

/// Insert a source row and bump the owning notebook's counter within `tx`.
pub(crate) async fn insert_source_tx(
    tx: &mut Transaction<'_, MySql>,
    req: &CreateSourceRequest,
) -> Result<Source> {
    let result = sqlx::query(
        "INSERT INTO sources (user_id, file_name, file_url, folder_name, location) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(req.user_id)
    .bind(&req.file_name)
    .bind(&req.file_url)
    .bind(&req.folder_name)
    .bind(&req.location)
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;

    let id = result.last_insert_id() as i64;

    sqlx::query(
        "UPDATE notebooks SET source_count = source_count + 1 WHERE user_id = ? AND title = ?",
    )
    .bind(req.user_id)
    .bind(&req.folder_name)
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;

    let row = sqlx::query(&format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE id = ?"))
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

    Ok(map_source(row))
}

#[async_trait]
impl SourceRepository for MySqlSourceRepository {
    async fn insert(&self, req: CreateSourceRequest) -> Result<Source> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let source = insert_source_tx(&mut tx, &req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(source)
    }

    async fn list_for_user(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Source>> {
        let rows = match folder_name {
            Some(folder) => sqlx::query(&format!(
                "SELECT {SOURCE_COLUMNS} FROM sources WHERE user_id = ? AND folder_name = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(user_id)
            .bind(folder)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?,
            None => sqlx::query(&format!(
                "SELECT {SOURCE_COLUMNS} FROM sources WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?,
        };

        Ok(rows.into_iter().map(map_source).collect())
    }
}
