//! Announcement repository.

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

use mindforge_core::{Announcement, Error, Page, PageRequest, Result};

use crate::escape_like;

const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, created_at";

fn map_announcement(r: MySqlRow) -> Announcement {
    Announcement {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        created_at: r.get("created_at"),
    }
}

pub struct MySqlAnnouncementRepository {
    pool: Pool<MySql>,
}

impl MySqlAnnouncementRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<Announcement> {
        let result = sqlx::query("INSERT INTO announcements (title, content) VALUES (?, ?)")
            .bind(title)
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let id = result.last_insert_id() as i64;
        self.get(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("announcement {id} missing after insert")))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Announcement>> {
        let row = sqlx::query(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_announcement))
    }

    pub async fn list_all(&self) -> Result<Vec<Announcement>> {
        let rows = sqlx::query(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_announcement).collect())
    }

    pub async fn list_page(&self, req: PageRequest) -> Result<Page<Announcement>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM announcements")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(req.limit())
        .bind(req.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Page::new(
            rows.into_iter().map(map_announcement).collect(),
            total,
            req,
        ))
    }

    pub async fn search_by_title(&self, title: &str) -> Result<Vec<Announcement>> {
        let rows = sqlx::query(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE title LIKE ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(format!("%{}%", escape_like(title)))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_announcement).collect())
    }

    pub async fn update(&self, id: i64, title: &str, content: &str) -> Result<Option<Announcement>> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE announcements SET title = ?, content = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
