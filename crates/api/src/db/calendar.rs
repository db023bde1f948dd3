//! Database operations for therapy sessions.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use solace_core::{ProfileId, SessionId, SessionStatus};

use super::RepositoryError;
use crate::models::TherapySession;

const SESSION_COLUMNS: &str = "id, client_id, therapist_id, starts_at, duration_minutes, \
                               status, notes, created_at, updated_at";

/// Parameters for scheduling a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub client_id: ProfileId,
    pub therapist_id: ProfileId,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

/// Fields that may change on an existing session. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub status: Option<SessionStatus>,
    pub starts_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Repository for therapy session database operations.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List sessions where `profile_id` is either the client or the therapist,
    /// in start order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_profile(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<TherapySession>, RepositoryError> {
        let sessions = sqlx::query_as::<_, TherapySession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM therapy_sessions \
             WHERE client_id = $1 OR therapist_id = $1 \
             ORDER BY starts_at ASC"
        ))
        .bind(profile_id)
        .fetch_all(self.pool)
        .await?;

        Ok(sessions)
    }

    /// Schedule a new session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if either profile does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, session), fields(client_id = %session.client_id, therapist_id = %session.therapist_id))]
    pub async fn create(&self, session: NewSession) -> Result<TherapySession, RepositoryError> {
        sqlx::query_as::<_, TherapySession>(&format!(
            "INSERT INTO therapy_sessions (client_id, therapist_id, starts_at, duration_minutes, notes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.client_id)
        .bind(session.therapist_id)
        .bind(session.starts_at)
        .bind(session.duration_minutes)
        .bind(&session.notes)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "unknown client or therapist"))
    }

    /// Apply an update to a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: SessionId,
        update: SessionUpdate,
    ) -> Result<TherapySession, RepositoryError> {
        sqlx::query_as::<_, TherapySession>(&format!(
            "UPDATE therapy_sessions \
             SET status = COALESCE($2, status), \
                 starts_at = COALESCE($3, starts_at), \
                 notes = COALESCE($4, notes), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(update.status)
        .bind(update.starts_at)
        .bind(&update.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Get a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: SessionId) -> Result<Option<TherapySession>, RepositoryError> {
        let session = sqlx::query_as::<_, TherapySession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM therapy_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(session)
    }

    /// Delete a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: SessionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM therapy_sessions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
