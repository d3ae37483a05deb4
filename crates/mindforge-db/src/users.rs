//! User repository implementation.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};
use tracing::info;

use mindforge_core::{Error, Page, PageRequest, Result, User, UserCredentials, UserRepository};

const USER_COLUMNS: &str = "id, email, avatar_url, created_at";

/// MySQL implementation of UserRepository.
pub struct MySqlUserRepository {
    pool: Pool<MySql>,
}

impl MySqlUserRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

fn map_user(r: MySqlRow) -> User {
    User {
        id: r.get("id"),
        email: r.get("email"),
        avatar_url: r.get("avatar_url"),
        created_at: r.get("created_at"),
    }
}

fn map_credentials(r: MySqlRow) -> UserCredentials {
    UserCredentials {
        id: r.get("id"),
        email: r.get("email"),
        password_hash: r.get("password_hash"),
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users (email, password_hash) VALUES (?, ?)")
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.last_insert_id() as i64)
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_user))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_user))
    }

    async fn credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let row = sqlx::query("SELECT id, email, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_credentials))
    }

    async fn credentials_by_id(&self, id: i64) -> Result<Option<UserCredentials>> {
        let row = sqlx::query("SELECT id, email, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_credentials))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_password_by_email(&self, email: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE email = ?")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_avatar(&self, id: i64, avatar_url: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET avatar_url = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_email(&self, id: i64, email: &str) -> Result<bool> {
        // MySQL reports 0 affected rows when the value is unchanged, so
        // existence is checked separately.
        let exists = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .is_some();
        if !exists {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET email = ? WHERE id = ?")
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(true)
    }

    async fn list_page(&self, req: PageRequest) -> Result<Page<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(req.limit())
        .bind(req.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Page::new(
            rows.into_iter().map(map_user).collect(),
            total,
            req,
        ))
    }

    async fn delete_cascade(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let notes = sqlx::query("DELETE FROM notes WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        let sources = sqlx::query("DELETE FROM sources WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        let notebooks = sqlx::query("DELETE FROM notebooks WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        let users = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        if users == 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Ok(false);
        }

        tx.commit().await.map_err(Error::Database)?;
        info!(
            subsystem = "db",
            db_table = "users",
            user_id = id,
            notes,
            sources,
            notebooks,
            "Deleted user with owned content"
        );
        Ok(true)
    }
}
