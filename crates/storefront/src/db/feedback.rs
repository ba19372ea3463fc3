//! Feedback repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use aiaxcart_core::{FeedbackId, UserId};

use super::RepositoryError;
use crate::models::Feedback;

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: i64,
    user_id: i64,
    user_name: String,
    message: String,
    image: String,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: FeedbackId::new(row.id),
            user_id: UserId::new(row.user_id),
            user_name: row.user_name,
            message: row.message,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

/// Repository for feedback entries.
pub struct FeedbackRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a feedback entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        user_name: &str,
        message: &str,
        image: &str,
    ) -> Result<Feedback, RepositoryError> {
        let row: FeedbackRow = sqlx::query_as(
            r"
            INSERT INTO feedback (user_id, user_name, message, image, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, user_name, message, image, created_at
            ",
        )
        .bind(user_id.as_i64())
        .bind(user_name)
        .bind(message)
        .bind(image)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List all feedback, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Feedback>, RepositoryError> {
        let rows: Vec<FeedbackRow> = sqlx::query_as(
            "SELECT id, user_id, user_name, message, image, created_at FROM feedback ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Feedback::from).collect())
    }
}
