//! Documents, feedback and workshops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solace_core::{DocumentId, FeedbackId, ProfileId, SessionId, WorkshopId};

/// Metadata for a document held in object storage.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: DocumentId,
    pub owner_id: ProfileId,
    pub title: String,
    /// Object storage key; the file itself is never served by this API.
    pub storage_path: String,
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A rating left by a client.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: FeedbackId,
    pub profile_id: ProfileId,
    pub session_id: Option<SessionId>,
    /// 1-5.
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A group workshop with its current registration count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workshop {
    pub id: WorkshopId,
    pub title: String,
    pub description: Option<String>,
    pub facilitator: String,
    pub starts_at: DateTime<Utc>,
    pub capacity: i32,
    pub registered_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Workshop {
    /// Seats still available.
    #[must_use]
    pub fn seats_left(&self) -> i64 {
        (i64::from(self.capacity) - self.registered_count).max(0)
    }

    /// Whether every seat is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.seats_left() == 0
    }
}
