//! Group workshops and registrations.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::{ProfileId, WorkshopId};

use crate::db::WorkshopRepository;
use crate::error::{ApiJson, ApiPath, Result};
use crate::models::Workshop;
use crate::state::AppState;

/// Response of `GET /api/workshops`.
#[derive(Debug, Serialize)]
pub struct WorkshopsResponse {
    pub success: bool,
    pub workshops: Vec<WorkshopListing>,
}

/// A workshop with its remaining seats.
#[derive(Debug, Serialize)]
pub struct WorkshopListing {
    #[serde(flatten)]
    pub workshop: Workshop,
    pub seats_left: i64,
    pub is_full: bool,
}

impl From<Workshop> for WorkshopListing {
    fn from(workshop: Workshop) -> Self {
        Self {
            seats_left: workshop.seats_left(),
            is_full: workshop.is_full(),
            workshop,
        }
    }
}

/// Upcoming workshops, soonest first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<WorkshopsResponse>> {
    let workshops = WorkshopRepository::new(state.pool())
        .list_upcoming()
        .await?
        .into_iter()
        .map(WorkshopListing::from)
        .collect();

    Ok(Json(WorkshopsResponse {
        success: true,
        workshops,
    }))
}

/// Body of `POST /api/workshops/{id}/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub profile_id: ProfileId,
}

/// Response of `POST /api/workshops/{id}/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub workshop_id: WorkshopId,
    pub profile_id: ProfileId,
}

/// Take a seat in a workshop. Responds 409 when it is full.
#[instrument(skip(state, request), fields(profile_id = %request.profile_id))]
pub async fn register(
    State(state): State<AppState>,
    ApiPath(workshop_id): ApiPath<WorkshopId>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    WorkshopRepository::new(state.pool())
        .register(workshop_id, request.profile_id)
        .await?;

    tracing::info!("Workshop registration added");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            workshop_id,
            profile_id: request.profile_id,
        }),
    ))
}

/// Give up a seat.
#[instrument(skip(state))]
pub async fn unregister(
    State(state): State<AppState>,
    ApiPath((workshop_id, profile_id)): ApiPath<(WorkshopId, ProfileId)>,
) -> Result<StatusCode> {
    WorkshopRepository::new(state.pool())
        .unregister(workshop_id, profile_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_listing_serializes_flat() {
        let workshop = Workshop {
            id: WorkshopId::generate(),
            title: "Sleep Hygiene".to_string(),
            description: None,
            facilitator: "Dr. Okafor".to_string(),
            starts_at: Utc::now(),
            capacity: 12,
            registered_count: 5,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(WorkshopListing::from(workshop)).expect("serialize");
        assert_eq!(json["title"], "Sleep Hygiene");
        assert_eq!(json["seats_left"], 7);
        assert_eq!(json["registered_count"], 5);
        assert_eq!(json["is_full"], false);
    }
}
