//! Calendar events and daily punch logs.

use chrono::NaiveDate;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

use mindforge_core::{CalendarEvent, Error, Result};

fn map_event(r: MySqlRow) -> CalendarEvent {
    CalendarEvent {
        id: r.get("id"),
        user_id: r.get("user_id"),
        date: r.get("date"),
        schedule: r.get("schedule"),
    }
}

pub struct MySqlEventRepository {
    pool: Pool<MySql>,
}

impl MySqlEventRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, date: NaiveDate, schedule: &str) -> Result<CalendarEvent> {
        let result = sqlx::query("INSERT INTO events (user_id, date, schedule) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(date)
            .bind(schedule)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(CalendarEvent {
            id: result.last_insert_id() as i64,
            user_id,
            date,
            schedule: schedule.to_string(),
        })
    }

    /// The user's events, latest date first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<CalendarEvent>> {
        let rows = sqlx::query(
            "SELECT id, user_id, date, schedule FROM events WHERE user_id = ? ORDER BY date DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_event).collect())
    }

    pub async fn delete_for_user(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct MySqlPunchRepository {
    pool: Pool<MySql>,
}

impl MySqlPunchRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Record a punch for `date`. Returns false when the user already punched
    /// that day.
    pub async fn punch(&self, user_id: i64, date: NaiveDate) -> Result<bool> {
        let result = sqlx::query("INSERT IGNORE INTO punch_logs (user_id, punch_date) VALUES (?, ?)")
            .bind(user_id)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Punch dates, oldest first.
    pub async fn list_dates(&self, user_id: i64) -> Result<Vec<NaiveDate>> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT punch_date FROM punch_logs WHERE user_id = ? ORDER BY punch_date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(dates)
    }
}
