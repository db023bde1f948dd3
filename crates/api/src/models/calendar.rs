//! Calendar domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use solace_core::{ProfileId, SessionId, SessionStatus};

/// A scheduled one-to-one therapy session.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TherapySession {
    pub id: SessionId,
    pub client_id: ProfileId,
    pub therapist_id: ProfileId,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TherapySession {
    /// When the session is scheduled to end.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at + Duration::minutes(i64::from(self.duration_minutes))
    }
}
