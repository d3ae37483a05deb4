//! Forum posts and comments.

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};
use tracing::info;

use mindforge_core::{defaults, Error, ForumComment, ForumPost, Page, PageRequest, Result};

use crate::escape_like;

const POST_COLUMNS: &str =
    "id, title, content, image_url, created_by, like_count, comment_count, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, post_id, content, is_anonymous, user_email, created_at";

fn map_post(r: MySqlRow) -> ForumPost {
    ForumPost {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        image_url: r.get("image_url"),
        created_by: r.get("created_by"),
        like_count: r.get("like_count"),
        comment_count: r.get("comment_count"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn map_comment(r: MySqlRow) -> ForumComment {
    ForumComment {
        id: r.get("id"),
        post_id: r.get("post_id"),
        content: r.get("content"),
        is_anonymous: r.get("is_anonymous"),
        user_email: r.get("user_email"),
        created_at: r.get("created_at"),
    }
}

// =============================================================================
// POSTS
// =============================================================================

pub struct MySqlForumPostRepository {
    pool: Pool<MySql>,
}

impl MySqlForumPostRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Create a post. A missing or blank image falls back to the default cover.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        image_url: Option<&str>,
        created_by: &str,
    ) -> Result<ForumPost> {
        let image_url = image_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults::DEFAULT_POST_IMAGE_URL);

        let result = sqlx::query(
            "INSERT INTO forum_posts (title, content, image_url, created_by) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(content)
        .bind(image_url)
        .bind(created_by)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let id = result.last_insert_id() as i64;
        self.get(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("post {id} missing after insert")))
    }

    pub async fn get(&self, id: i64) -> Result<Option<ForumPost>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM forum_posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_post))
    }

    pub async fn list_all(&self) -> Result<Vec<ForumPost>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM forum_posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_post).collect())
    }

    pub async fn list_page(&self, req: PageRequest) -> Result<Page<ForumPost>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forum_posts")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM forum_posts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(req.limit())
        .bind(req.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Page::new(rows.into_iter().map(map_post).collect(), total, req))
    }

    /// Posts whose author email contains `email`.
    pub async fn search_by_author(&self, email: &str) -> Result<Vec<ForumPost>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM forum_posts WHERE created_by LIKE ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(format!("%{}%", escape_like(email)))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_post).collect())
    }

    pub async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<Option<ForumPost>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };
        let image_url = image_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&existing.image_url);

        sqlx::query("UPDATE forum_posts SET title = ?, content = ?, image_url = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(image_url)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        self.get(id).await
    }

    /// Delete a post and its comments in one transaction.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let comments = sqlx::query("DELETE FROM forum_comments WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        let posts = sqlx::query("DELETE FROM forum_posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        if posts == 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(false);
        }

        tx.commit().await.map_err(Error::Database)?;
        info!(subsystem = "db", db_table = "forum_posts", post_id = id, comments, "Deleted post");
        Ok(true)
    }

    pub async fn like(&self, id: i64) -> Result<Option<ForumPost>> {
        let result = sqlx::query("UPDATE forum_posts SET like_count = like_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

// =============================================================================
// COMMENTS
// =============================================================================

pub struct MySqlForumCommentRepository {
    pool: Pool<MySql>,
}

impl MySqlForumCommentRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Add a comment and bump the post's `comment_count` in one transaction.
    /// Returns `None` when the post does not exist.
    pub async fn create(
        &self,
        post_id: i64,
        content: &str,
        is_anonymous: bool,
        user_email: Option<&str>,
    ) -> Result<Option<ForumComment>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let bumped = sqlx::query(
            "UPDATE forum_posts SET comment_count = comment_count + 1 WHERE id = ?",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        if bumped == 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(None);
        }

        let result = sqlx::query(
            "INSERT INTO forum_comments (post_id, content, is_anonymous, user_email) VALUES (?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(content)
        .bind(is_anonymous)
        .bind(user_email)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM forum_comments WHERE id = ?"))
            .bind(result.last_insert_id() as i64)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(Some(map_comment(row)))
    }

    pub async fn get(&self, id: i64) -> Result<Option<ForumComment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM forum_comments WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_comment))
    }

    pub async fn list_all(&self) -> Result<Vec<ForumComment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM forum_comments ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_comment).collect())
    }

    pub async fn list_page(&self, req: PageRequest) -> Result<Page<ForumComment>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forum_comments")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM forum_comments ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(req.limit())
        .bind(req.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Page::new(rows.into_iter().map(map_comment).collect(), total, req))
    }

    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<ForumComment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM forum_comments WHERE post_id = ? ORDER BY created_at ASC, id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_comment).collect())
    }

    /// Comments whose author email contains `email`.
    pub async fn search_by_email(&self, email: &str) -> Result<Vec<ForumComment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM forum_comments WHERE user_email LIKE ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(format!("%{}%", escape_like(email)))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_comment).collect())
    }

    pub async fn update(&self, id: i64, content: &str) -> Result<Option<ForumComment>> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE forum_comments SET content = ? WHERE id = ?")
            .bind(content)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        self.get(id).await
    }

    /// Delete a comment and decrement its post's `comment_count` (floored at 0).
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let post_id: Option<i64> =
            sqlx::query_scalar("SELECT post_id FROM forum_comments WHERE id = ? FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        let Some(post_id) = post_id else {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(false);
        };

        sqlx::query("DELETE FROM forum_comments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query(
            "UPDATE forum_posts SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = ?",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(true)
    }
}
