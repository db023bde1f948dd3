//! Database operations for documents, feedback and workshops.

use sqlx::PgPool;
use tracing::instrument;

use solace_core::{DocumentId, ProfileId, SessionId, WorkshopId};

use super::RepositoryError;
use crate::models::{Document, Feedback, Workshop};

// =============================================================================
// Documents
// =============================================================================

/// Parameters for recording a document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub owner_id: ProfileId,
    pub title: String,
    pub storage_path: String,
    pub mime_type: Option<String>,
}

/// Repository for document metadata.
pub struct DocumentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentRepository<'a> {
    /// Create a new document repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a profile's documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_owner(
        &self,
        owner_id: ProfileId,
    ) -> Result<Vec<Document>, RepositoryError> {
        let documents = sqlx::query_as::<_, Document>(
            r"
            SELECT id, owner_id, title, storage_path, mime_type, created_at
            FROM documents
            WHERE owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(documents)
    }

    /// Record a document that has already been uploaded to storage.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, document), fields(owner_id = %document.owner_id))]
    pub async fn create(&self, document: NewDocument) -> Result<Document, RepositoryError> {
        sqlx::query_as::<_, Document>(
            r"
            INSERT INTO documents (owner_id, title, storage_path, mime_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, storage_path, mime_type, created_at
            ",
        )
        .bind(document.owner_id)
        .bind(&document.title)
        .bind(&document.storage_path)
        .bind(&document.mime_type)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "unknown owner"))
    }

    /// Delete a document's metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the document does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Feedback
// =============================================================================

/// Parameters for submitting feedback.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub profile_id: ProfileId,
    pub session_id: Option<SessionId>,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Repository for feedback.
pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store feedback.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the profile or session does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, feedback), fields(profile_id = %feedback.profile_id))]
    pub async fn create(&self, feedback: NewFeedback) -> Result<Feedback, RepositoryError> {
        sqlx::query_as::<_, Feedback>(
            r"
            INSERT INTO feedback (profile_id, session_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, profile_id, session_id, rating, comment, created_at
            ",
        )
        .bind(feedback.profile_id)
        .bind(feedback.session_id)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "unknown profile or session"))
    }

    /// List feedback left by a profile, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_profile(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<Feedback>, RepositoryError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r"
            SELECT id, profile_id, session_id, rating, comment, created_at
            FROM feedback
            WHERE profile_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(profile_id)
        .fetch_all(self.pool)
        .await?;

        Ok(feedback)
    }
}

// =============================================================================
// Workshops
// =============================================================================

/// Repository for workshops and registrations.
pub struct WorkshopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WorkshopRepository<'a> {
    /// Create a new workshop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List workshops that have not started yet, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_upcoming(&self) -> Result<Vec<Workshop>, RepositoryError> {
        let workshops = sqlx::query_as::<_, Workshop>(
            r"
            SELECT w.id, w.title, w.description, w.facilitator, w.starts_at, w.capacity,
                   COUNT(r.profile_id) AS registered_count, w.created_at
            FROM workshops w
            LEFT JOIN workshop_registrations r ON r.workshop_id = w.id
            WHERE w.starts_at > NOW()
            GROUP BY w.id
            ORDER BY w.starts_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(workshops)
    }

    /// Register a profile for a workshop if a seat is free.
    ///
    /// The workshop row is locked for the length of the transaction, so
    /// concurrent registrations see each other's seats.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the workshop does not exist.
    /// Returns `RepositoryError::Conflict` if the workshop is full or the
    /// profile is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        workshop_id: WorkshopId,
        profile_id: ProfileId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (capacity,): (i32,) =
            sqlx::query_as("SELECT capacity FROM workshops WHERE id = $1 FOR UPDATE")
                .bind(workshop_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        let (registered,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workshop_registrations WHERE workshop_id = $1")
                .bind(workshop_id)
                .fetch_one(&mut *tx)
                .await?;

        if registered >= i64::from(capacity) {
            return Err(RepositoryError::Conflict("workshop is full".to_owned()));
        }

        sqlx::query("INSERT INTO workshop_registrations (workshop_id, profile_id) VALUES ($1, $2)")
            .bind(workshop_id)
            .bind(profile_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, "already registered"))?;

        tx.commit().await?;
        Ok(())
    }

    /// Cancel a registration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there was no such registration.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn unregister(
        &self,
        workshop_id: WorkshopId,
        profile_id: ProfileId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM workshop_registrations WHERE workshop_id = $1 AND profile_id = $2",
        )
        .bind(workshop_id)
        .bind(profile_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
