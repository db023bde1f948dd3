//! Therapy session scheduling.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::validation::sanitize_input;
use solace_core::{ProfileId, SessionId, SessionStatus};

use crate::db::SessionRepository;
use crate::db::calendar::{NewSession, SessionUpdate};
use crate::error::{ApiJson, ApiPath, ApiQuery, AppError, Result};
use crate::models::TherapySession;
use crate::state::AppState;

/// Shortest bookable session, in minutes.
pub const MIN_SESSION_MINUTES: i32 = 15;
/// Longest bookable session, in minutes.
pub const MAX_SESSION_MINUTES: i32 = 240;

/// Query of `GET /api/sessions`.
#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub profile_id: ProfileId,
}

/// Response carrying a list of sessions.
#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub success: bool,
    pub sessions: Vec<TherapySession>,
}

/// Response carrying a single session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: TherapySession,
}

/// Sessions where the profile is either client or therapist.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionsQuery>,
) -> Result<Json<SessionsResponse>> {
    let sessions = SessionRepository::new(state.pool())
        .list_for_profile(query.profile_id)
        .await?;

    Ok(Json(SessionsResponse {
        success: true,
        sessions,
    }))
}

/// Body of `POST /api/sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub client_id: ProfileId,
    pub therapist_id: ProfileId,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateSessionRequest {
    /// Check the booking and sanitize the notes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if client and therapist are the same
    /// profile or the duration is out of range.
    pub fn into_new_session(self) -> Result<NewSession> {
        if self.client_id == self.therapist_id {
            return Err(AppError::BadRequest(
                "client and therapist must be different".to_string(),
            ));
        }
        if !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&self.duration_minutes) {
            return Err(AppError::BadRequest(format!(
                "duration_minutes must be between {MIN_SESSION_MINUTES} and {MAX_SESSION_MINUTES}"
            )));
        }

        Ok(NewSession {
            client_id: self.client_id,
            therapist_id: self.therapist_id,
            starts_at: self.starts_at,
            duration_minutes: self.duration_minutes,
            notes: sanitize_notes(self.notes),
        })
    }
}

/// Schedule a session.
#[instrument(skip(state, request), fields(client_id = %request.client_id, therapist_id = %request.therapist_id))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let new_session = request.into_new_session()?;
    let session = SessionRepository::new(state.pool())
        .create(new_session)
        .await?;

    tracing::info!(
        session_id = %session.id,
        starts_at = %session.starts_at,
        ends_at = %session.ends_at(),
        "Session scheduled"
    );

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            session,
        }),
    ))
}

/// Body of `PATCH /api/sessions/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateSessionRequest {
    /// Convert into a repository update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if no field is set.
    pub fn into_update(self) -> Result<SessionUpdate> {
        if self.status.is_none() && self.starts_at.is_none() && self.notes.is_none() {
            return Err(AppError::BadRequest("nothing to update".to_string()));
        }

        Ok(SessionUpdate {
            status: self.status,
            starts_at: self.starts_at,
            notes: sanitize_notes(self.notes),
        })
    }
}

/// Reschedule, cancel or annotate a session.
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SessionId>,
    ApiJson(request): ApiJson<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>> {
    let update = request.into_update()?;
    let repo = SessionRepository::new(state.pool());

    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("session".to_string()))?;
    if update.starts_at.is_some() && !existing.status.is_open() {
        return Err(AppError::Conflict(
            "only scheduled sessions can be rescheduled".to_string(),
        ));
    }

    let session = repo.update(id, update).await?;

    Ok(Json(SessionResponse {
        success: true,
        session,
    }))
}

/// Remove a session.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SessionId>,
) -> Result<StatusCode> {
    SessionRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn sanitize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| sanitize_input(&n))
        .filter(|n| !n.is_empty())
}
