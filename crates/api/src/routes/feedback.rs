//! Session and service feedback.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::validation::sanitize_input;
use solace_core::{ProfileId, SessionId};

use crate::db::FeedbackRepository;
use crate::db::content::NewFeedback;
use crate::error::{ApiJson, ApiQuery, AppError, Result};
use crate::models::Feedback;
use crate::state::AppState;

/// Lowest accepted rating.
pub const MIN_RATING: i16 = 1;
/// Highest accepted rating.
pub const MAX_RATING: i16 = 5;

/// Body of `POST /api/feedback`.
#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub profile_id: ProfileId,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SubmitFeedbackRequest {
    /// Check the rating and sanitize the comment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the rating is outside 1-5.
    pub fn into_new_feedback(self) -> Result<NewFeedback> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::BadRequest(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        Ok(NewFeedback {
            profile_id: self.profile_id,
            session_id: self.session_id,
            rating: self.rating,
            comment: self
                .comment
                .map(|c| sanitize_input(&c))
                .filter(|c| !c.is_empty()),
        })
    }
}

/// Response carrying a single feedback entry.
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub feedback: Feedback,
}

/// Submit feedback.
#[instrument(skip(state, request), fields(profile_id = %request.profile_id, rating = request.rating))]
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>)> {
    let feedback = FeedbackRepository::new(state.pool())
        .create(request.into_new_feedback()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            success: true,
            feedback,
        }),
    ))
}

/// Query of `GET /api/feedback`.
#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub profile_id: ProfileId,
}

/// Response carrying a list of feedback entries.
#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub success: bool,
    pub feedback: Vec<Feedback>,
}

/// List feedback left by a profile.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeedbackQuery>,
) -> Result<Json<FeedbackListResponse>> {
    let feedback = FeedbackRepository::new(state.pool())
        .list_for_profile(query.profile_id)
        .await?;

    Ok(Json(FeedbackListResponse {
        success: true,
        feedback,
    }))
}
