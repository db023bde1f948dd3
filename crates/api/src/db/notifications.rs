//! Database operations for notifications.

use sqlx::PgPool;
use tracing::instrument;

use solace_core::{NotificationChannel, ProfileId};

use super::RepositoryError;
use crate::models::Notification;

/// Parameters for creating a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: ProfileId,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub channel: NotificationChannel,
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id))]
    pub async fn create(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, RepositoryError> {
        sqlx::query_as::<_, Notification>(
            r"
            INSERT INTO notifications (user_id, title, message, notification_type, channel)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, message, notification_type, channel, read_at, created_at
            ",
        )
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.notification_type)
        .bind(notification.channel)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "unknown user"))
    }
}
