//! Admin dashboard aggregates.

use std::time::Instant;

use futures::try_join;
use sqlx::{MySql, Pool, Row};
use tracing::debug;

use mindforge_core::{
    defaults, AdminStats, DailyCount, DailyStats, EmailUpdatesCount, Error, LocationCount,
    Result, TopUser, TotalCounts,
};

/// Tables with a daily trend series. Fixed names, never user input.
const TREND_TABLES: [&str; 4] = ["users", "notes", "sources", "feedback"];

pub struct MySqlStatsRepository {
    pool: Pool<MySql>,
}

impl MySqlStatsRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Run all dashboard queries concurrently and merge them.
    pub async fn collect(&self) -> Result<AdminStats> {
        let start = Instant::now();
        let [users, notes, sources, feedback] = TREND_TABLES;

        let (
            total_counts,
            daily_users,
            daily_notes,
            daily_files,
            daily_feedback,
            top_users_by_notes,
            file_location_distribution,
            feedback_email_updates,
        ) = try_join!(
            self.total_counts(),
            self.daily_counts(users),
            self.daily_counts(notes),
            self.daily_counts(sources),
            self.daily_counts(feedback),
            self.top_users_by_notes(),
            self.file_locations(),
            self.email_updates(),
        )?;

        debug!(
            subsystem = "db",
            op = "admin_stats",
            duration_ms = start.elapsed().as_millis() as u64,
            "Collected admin stats"
        );

        Ok(AdminStats {
            total_counts,
            daily_stats: DailyStats {
                users: daily_users,
                notes: daily_notes,
                files: daily_files,
                feedback: daily_feedback,
            },
            top_users_by_notes,
            file_location_distribution,
            feedback_email_updates,
        })
    }

    async fn total_counts(&self) -> Result<TotalCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS user_count,
                (SELECT COUNT(*) FROM notes) AS note_count,
                (SELECT COUNT(*) FROM notebooks) AS notebook_count,
                (SELECT COUNT(*) FROM sources) AS file_count,
                (SELECT COUNT(*) FROM feedback) AS feedback_count
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(TotalCounts {
            user_count: row.get("user_count"),
            note_count: row.get("note_count"),
            notebook_count: row.get("notebook_count"),
            file_count: row.get("file_count"),
            feedback_count: row.get("feedback_count"),
        })
    }

    /// Rows per day over the trend window, oldest first. Days without rows
    /// are omitted.
    async fn daily_counts(&self, table: &'static str) -> Result<Vec<DailyCount>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT DATE(created_at) AS date, COUNT(*) AS count
            FROM {table}
            WHERE created_at >= CURDATE() - INTERVAL ? DAY
            GROUP BY DATE(created_at)
            ORDER BY date
            "#
        ))
        .bind(defaults::STATS_TREND_DAYS - 1)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| DailyCount {
                date: r.get("date"),
                count: r.get("count"),
            })
            .collect())
    }

    async fn top_users_by_notes(&self) -> Result<Vec<TopUser>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.email, COUNT(n.id) AS note_count
            FROM users u
            JOIN notes n ON u.id = n.user_id
            GROUP BY u.id, u.email
            ORDER BY note_count DESC
            LIMIT ?
            "#,
        )
        .bind(defaults::STATS_TOP_USERS)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| TopUser {
                id: r.get("id"),
                email: r.get("email"),
                note_count: r.get("note_count"),
            })
            .collect())
    }

    async fn file_locations(&self) -> Result<Vec<LocationCount>> {
        let rows = sqlx::query("SELECT location, COUNT(*) AS count FROM sources GROUP BY location")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| LocationCount {
                location: r.get("location"),
                count: r.get("count"),
            })
            .collect())
    }

    async fn email_updates(&self) -> Result<Vec<EmailUpdatesCount>> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(email_updates AS SIGNED) AS flag, COUNT(*) AS count
            FROM feedback
            GROUP BY email_updates
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| EmailUpdatesCount {
                email_updates: r.get::<i64, _>("flag") != 0,
                count: r.get("count"),
            })
            .collect())
    }
}
