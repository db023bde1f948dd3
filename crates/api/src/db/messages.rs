//! Database operations for conversation messages.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use solace_core::{ConversationId, MessageId, MessageType, ProfileId};

use super::RepositoryError;
use crate::models::{ConversationSummary, Message};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: MessageId,
    conversation_id: ConversationId,
    sender_id: ProfileId,
    recipient_id: ProfileId,
    content: String,
    message_type: MessageType,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            content: row.content,
            message_type: row.message_type,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    #[sqlx(flatten)]
    message: MessageRow,
    unread_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Parameters for storing a new message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: ProfileId,
    pub recipient_id: ProfileId,
    pub content: String,
    pub message_type: MessageType,
}

/// Repository for message database operations.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if either participant does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, message), fields(conversation_id = %message.conversation_id))]
    pub async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r"
            INSERT INTO messages (conversation_id, sender_id, recipient_id, content, message_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, conversation_id, sender_id, recipient_id, content,
                      message_type, read_at, created_at
            ",
        )
        .bind(&message.conversation_id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.content)
        .bind(message.message_type)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "unknown sender or recipient"))?;

        Ok(row.into())
    }

    /// List every conversation `user_id` takes part in, most recent first.
    ///
    /// Each entry carries the latest message and the number of messages
    /// addressed to `user_id` that are still unread.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        user_id: ProfileId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r"
            SELECT * FROM (
                SELECT DISTINCT ON (m.conversation_id)
                       m.id, m.conversation_id, m.sender_id, m.recipient_id, m.content,
                       m.message_type, m.read_at, m.created_at,
                       (
                           SELECT COUNT(*)
                           FROM messages u
                           WHERE u.conversation_id = m.conversation_id
                             AND u.recipient_id = $1
                             AND u.read_at IS NULL
                       ) AS unread_count
                FROM messages m
                WHERE m.sender_id = $1 OR m.recipient_id = $1
                ORDER BY m.conversation_id, m.created_at DESC
            ) latest
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let last_message = Message::from(row.message);
                ConversationSummary {
                    conversation_id: last_message.conversation_id.clone(),
                    participant_id: last_message.counterpart(user_id),
                    last_message,
                    unread_count: row.unread_count,
                }
            })
            .collect())
    }

    /// Get the most recent `limit` messages of a conversation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    pub async fn list_thread(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r"
            SELECT * FROM (
                SELECT id, conversation_id, sender_id, recipient_id, content,
                       message_type, read_at, created_at
                FROM messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            ",
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    /// Mark every unread message addressed to `reader` in a conversation as read.
    ///
    /// Returns the number of messages updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    pub async fn mark_read(
        &self,
        conversation_id: &ConversationId,
        reader: ProfileId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET read_at = NOW()
            WHERE conversation_id = $1 AND recipient_id = $2 AND read_at IS NULL
            ",
        )
        .bind(conversation_id)
        .bind(reader)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
