//! Notification service layer
//!
//! Notifications are created by system events (proposal decisions,
//! milestone updates) and only ever mutated to flip their read state.

use sqlx::{PgPool, Postgres};
use thiserror::Error;
use uuid::Uuid;

use crate::notification::Notification;

/// Notification service errors
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Notification not found")]
    NotFound,
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        NotificationError::DatabaseError(e.to_string())
    }
}

/// Insert a notification inside an open database transaction
///
/// Used by services that notify as part of a larger atomic change (e.g. a
/// milestone completing).
pub async fn insert_in_tx(
    db_tx: &mut sqlx::Transaction<'_, Postgres>,
    user_id: Uuid,
    kind: &str,
    title: &str,
    body: Option<&str>,
    link: Option<&str>,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, user_id, kind, title, body, link, is_read)
        VALUES ($1, $2, $3, $4, $5, $6, FALSE)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(kind)
    .bind(title)
    .bind(body)
    .bind(link)
    .fetch_one(&mut **db_tx)
    .await
}

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    db_pool: PgPool,
}

impl NotificationService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a notification for a user
    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: &str,
        title: &str,
        body: Option<&str>,
        link: Option<&str>,
    ) -> Result<Notification, NotificationError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, body, link, is_read)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(body)
        .bind(link)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(notification)
    }

    /// A user's notifications, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, NotificationError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(notifications)
    }

    /// Mark one notification as read (owner-scoped)
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<Notification, NotificationError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        notification.ok_or(NotificationError::NotFound)
    }

    /// Mark all of a user's notifications as read, returning the count
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        let rows_affected = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }
}
