//! Subscription plan changes and failed-renewal handling.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::subscription::{PlanChange, PlanTier, RetrySchedule, is_retry_limit_reached};
use solace_core::{ProfileId, SubscriptionId, SubscriptionStatus};

use crate::db::{RepositoryError, SubscriptionRepository};
use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::models::Subscription;
use crate::routes::pricing::{ProrationQuote, plan_for};
use crate::state::AppState;

/// Response carrying a subscription.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub success: bool,
    pub subscription: Subscription,
}

/// A profile's current subscription.
#[instrument(skip(state))]
pub async fn get_for_profile(
    State(state): State<AppState>,
    ApiPath(profile_id): ApiPath<ProfileId>,
) -> Result<Json<SubscriptionResponse>> {
    let subscription = SubscriptionRepository::new(state.pool())
        .get_for_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound("subscription".to_string()))?;

    Ok(Json(SubscriptionResponse {
        success: true,
        subscription,
    }))
}

// =============================================================================
// Plan changes
// =============================================================================

/// Body of `POST /api/subscriptions/{id}/change-plan`.
#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    pub new_plan: String,
}

/// Response of `POST /api/subscriptions/{id}/change-plan`.
#[derive(Debug, Serialize)]
pub struct ChangePlanResponse {
    pub success: bool,
    pub subscription: Subscription,
    pub proration: ProrationQuote,
}

/// Check that `subscription` may move to `new_plan`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an unknown or unchanged plan and
/// `AppError::Conflict` for a cancelled subscription.
pub fn plan_change_for(subscription: &Subscription, new_plan: &str) -> Result<PlanTier> {
    if subscription.status == SubscriptionStatus::Cancelled {
        return Err(AppError::Conflict(
            "cancelled subscriptions cannot change plan".to_string(),
        ));
    }

    let new_tier: PlanTier = new_plan.parse()?;
    if PlanChange::between(subscription.plan_tier, new_tier) == PlanChange::Unchanged {
        return Err(AppError::BadRequest(format!(
            "subscription is already on the {new_tier} plan"
        )));
    }
    Ok(new_tier)
}

/// Move a subscription up or down the plan hierarchy.
///
/// The quote covers the days left in the current period.
#[instrument(skip(state, request), fields(new_plan = %request.new_plan))]
pub async fn change_plan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubscriptionId>,
    ApiJson(request): ApiJson<ChangePlanRequest>,
) -> Result<Json<ChangePlanResponse>> {
    let repo = SubscriptionRepository::new(state.pool());
    let subscription = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("subscription".to_string()))?;

    let new_tier = plan_change_for(&subscription, &request.new_plan)?;

    let current = plan_for(&state, subscription.plan_tier).await?;
    let new = plan_for(&state, new_tier).await?;
    let proration = ProrationQuote::between(
        &current,
        &new,
        subscription.days_remaining(Utc::now()),
        subscription.period_days(),
    )?;

    let subscription = repo.change_plan(id, new_tier).await?;

    tracing::info!(
        change = ?proration.change,
        amount = %proration.amount,
        "Subscription plan changed"
    );

    Ok(Json(ChangePlanResponse {
        success: true,
        subscription,
        proration,
    }))
}

// =============================================================================
// Failed renewals
// =============================================================================

/// Outcome of a failed renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    /// Attempts used so far, including the one just scheduled.
    pub retry_attempt: u32,
    pub status: SubscriptionStatus,
    /// `None` once the subscription has been cancelled.
    pub schedule: Option<RetrySchedule>,
}

impl FailureOutcome {
    /// Decide what happens after a renewal fails, given the retries already
    /// used.
    ///
    /// Each failure schedules the next rung of the backoff ladder. When the
    /// retries are exhausted the subscription is cancelled instead.
    #[must_use]
    pub fn after_failure(attempts_used: u32, now: DateTime<Utc>) -> Self {
        if is_retry_limit_reached(attempts_used) {
            return Self {
                retry_attempt: attempts_used,
                status: SubscriptionStatus::Cancelled,
                schedule: None,
            };
        }

        let attempt = attempts_used.saturating_add(1);
        Self {
            retry_attempt: attempt,
            status: SubscriptionStatus::PastDue,
            schedule: Some(RetrySchedule::new(attempt, now)),
        }
    }
}

/// Response of `POST /api/subscriptions/{id}/payment-failed`.
#[derive(Debug, Serialize)]
pub struct PaymentFailedResponse {
    pub success: bool,
    pub subscription: Subscription,
    pub retry_schedule: Option<RetrySchedule>,
}

/// Record a failed renewal and schedule the next retry.
#[instrument(skip(state))]
pub async fn payment_failed(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubscriptionId>,
) -> Result<Json<PaymentFailedResponse>> {
    let repo = SubscriptionRepository::new(state.pool());
    let subscription = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("subscription".to_string()))?;

    if subscription.status == SubscriptionStatus::Cancelled {
        return Err(AppError::Conflict(
            "subscription is already cancelled".to_string(),
        ));
    }

    let attempts_used = u32::try_from(subscription.retry_attempt).map_err(|_| {
        RepositoryError::DataCorruption(format!(
            "negative retry_attempt {}",
            subscription.retry_attempt
        ))
    })?;
    let outcome = FailureOutcome::after_failure(attempts_used, Utc::now());

    let retry_attempt = i32::try_from(outcome.retry_attempt)
        .map_err(|_| AppError::Internal("retry attempt out of range".to_string()))?;
    let subscription = repo
        .record_payment_failure(
            id,
            subscription.retry_attempt,
            retry_attempt,
            outcome.schedule.map(|s| s.next_retry_date),
            outcome.status,
        )
        .await?;

    match outcome.schedule {
        Some(schedule) => tracing::warn!(
            attempt = schedule.attempt,
            next_retry_date = %schedule.next_retry_date,
            "Renewal failed, retry scheduled"
        ),
        None => tracing::warn!("Renewal retries exhausted, subscription cancelled"),
    }

    Ok(Json(PaymentFailedResponse {
        success: true,
        subscription,
        retry_schedule: outcome.schedule,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn subscription(tier: PlanTier, status: SubscriptionStatus) -> Subscription {
        Subscription {
            id: SubscriptionId::generate(),
            profile_id: ProfileId::generate(),
            plan_tier: tier,
            status,
            current_period_start: Utc::now(),
            current_period_end: Utc::now() + Duration::days(30),
            retry_attempt: 0,
            next_retry_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plan_change_accepts_upgrade_and_downgrade() {
        let sub = subscription(PlanTier::Premium, SubscriptionStatus::Active);
        assert_eq!(
            plan_change_for(&sub, "enterprise").unwrap(),
            PlanTier::Enterprise
        );
        assert_eq!(plan_change_for(&sub, "Basic").unwrap(), PlanTier::Basic);
    }

    #[test]
    fn test_plan_change_rejects_unknown_and_unchanged() {
        let sub = subscription(PlanTier::Premium, SubscriptionStatus::Active);
        assert!(matches!(
            plan_change_for(&sub, "platinum"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            plan_change_for(&sub, "premium"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_plan_change_rejects_cancelled() {
        let sub = subscription(PlanTier::Basic, SubscriptionStatus::Cancelled);
        assert!(matches!(
            plan_change_for(&sub, "premium"),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_failures_walk_the_backoff_ladder() {
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();

        let first = FailureOutcome::after_failure(0, now);
        assert_eq!(first.status, SubscriptionStatus::PastDue);
        assert_eq!(first.retry_attempt, 1);
        assert_eq!(first.schedule.unwrap().next_retry_date, now + Duration::days(1));

        let second = FailureOutcome::after_failure(1, now);
        assert_eq!(second.schedule.unwrap().next_retry_date, now + Duration::days(3));

        let third = FailureOutcome::after_failure(2, now);
        assert_eq!(third.schedule.unwrap().next_retry_date, now + Duration::days(7));
        assert!(third.schedule.unwrap().is_final());
    }

    #[test]
    fn test_exhausted_retries_cancel() {
        let now = Utc::now();
        let outcome = FailureOutcome::after_failure(3, now);
        assert_eq!(outcome.status, SubscriptionStatus::Cancelled);
        assert_eq!(outcome.retry_attempt, 3);
        assert!(outcome.schedule.is_none());
    }
}
