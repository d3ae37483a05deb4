//! Feedback repository.

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

use mindforge_core::{Error, Feedback, Page, PageRequest, Result};

const FEEDBACK_COLUMNS: &str = "id, user_id, content, screenshot_url, email_updates, created_at";

fn map_feedback(r: MySqlRow) -> Feedback {
    Feedback {
        id: r.get("id"),
        user_id: r.get("user_id"),
        content: r.get("content"),
        screenshot_url: r.get("screenshot_url"),
        email_updates: r.get("email_updates"),
        created_at: r.get("created_at"),
    }
}

pub struct MySqlFeedbackRepository {
    pool: Pool<MySql>,
}

impl MySqlFeedbackRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        content: &str,
        screenshot_url: Option<&str>,
        email_updates: bool,
    ) -> Result<Feedback> {
        let result = sqlx::query(
            "INSERT INTO feedback (user_id, content, screenshot_url, email_updates) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(content)
        .bind(screenshot_url)
        .bind(email_updates)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let row = sqlx::query(&format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = ?"))
            .bind(result.last_insert_id() as i64)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(map_feedback(row))
    }

    pub async fn list_page(&self, req: PageRequest) -> Result<Page<Feedback>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(req.limit())
        .bind(req.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Page::new(rows.into_iter().map(map_feedback).collect(), total, req))
    }
}
