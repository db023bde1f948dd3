//! Pricing page and plan-change quotes.

use std::sync::Arc;

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::Currency;
use solace_core::subscription::{PlanChange, PlanTier, calculate_proration_amount};

use crate::error::{ApiJson, AppError, Result};
use crate::models::PricingPlan;
use crate::state::AppState;

/// Response of `GET /api/pricing/plans`.
#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Arc<Vec<PricingPlan>>,
}

/// Active plans, cheapest first.
#[instrument(skip(state))]
pub async fn plans(State(state): State<AppState>) -> Result<Json<PlansResponse>> {
    let plans = state.pricing().active_plans(state.pool()).await?;
    Ok(Json(PlansResponse {
        success: true,
        plans,
    }))
}

/// Amount owed for switching plans part way through a billing period.
#[derive(Debug, Clone, Serialize)]
pub struct ProrationQuote {
    pub change: PlanChange,
    pub current_plan: PlanTier,
    pub new_plan: PlanTier,
    pub days_remaining: i64,
    pub total_days_in_period: i64,
    /// Positive is charged to the customer, negative is refunded. Not rounded.
    pub amount: Decimal,
    pub currency: Currency,
}

impl ProrationQuote {
    /// Quote a move from `current` to `new`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the plans are priced in different
    /// currencies, and `AppError::Proration` if the period is empty.
    pub fn between(
        current: &PricingPlan,
        new: &PricingPlan,
        days_remaining: i64,
        total_days_in_period: i64,
    ) -> Result<Self> {
        if current.currency != new.currency {
            return Err(AppError::BadRequest(format!(
                "cannot prorate between {} and {} plans",
                current.currency, new.currency
            )));
        }

        let amount = calculate_proration_amount(
            current.monthly_price,
            new.monthly_price,
            days_remaining,
            total_days_in_period,
        )?;

        Ok(Self {
            change: PlanChange::between(current.tier, new.tier),
            current_plan: current.tier,
            new_plan: new.tier,
            days_remaining,
            total_days_in_period,
            amount,
            currency: current.currency,
        })
    }
}

/// Body of `POST /api/pricing/proration`.
#[derive(Debug, Deserialize)]
pub struct ProrationRequest {
    pub current_plan: String,
    pub new_plan: String,
    pub days_remaining: i64,
    pub total_days_in_period: i64,
}

impl ProrationRequest {
    /// Parse both plan names and check the day counts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for unknown plans or a `days_remaining`
    /// outside `0..=total_days_in_period`.
    pub fn tiers(&self) -> Result<(PlanTier, PlanTier)> {
        let current: PlanTier = self.current_plan.parse()?;
        let new: PlanTier = self.new_plan.parse()?;

        if self.days_remaining < 0 || self.days_remaining > self.total_days_in_period {
            return Err(AppError::BadRequest(
                "days_remaining must be between 0 and total_days_in_period".to_string(),
            ));
        }

        Ok((current, new))
    }
}

/// Response of `POST /api/pricing/proration`.
#[derive(Debug, Serialize)]
pub struct ProrationResponse {
    pub success: bool,
    pub proration: ProrationQuote,
}

/// Quote a plan change from the stored monthly prices.
#[instrument(skip(state))]
pub async fn proration(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ProrationRequest>,
) -> Result<Json<ProrationResponse>> {
    let (current_tier, new_tier) = request.tiers()?;

    let current = plan_for(&state, current_tier).await?;
    let new = plan_for(&state, new_tier).await?;

    let proration = ProrationQuote::between(
        &current,
        &new,
        request.days_remaining,
        request.total_days_in_period,
    )?;

    Ok(Json(ProrationResponse {
        success: true,
        proration,
    }))
}

/// The active plan for `tier`, or 404.
pub(crate) async fn plan_for(state: &AppState, tier: PlanTier) -> Result<PricingPlan> {
    state
        .pricing()
        .plan_for(state.pool(), tier)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{tier} plan")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use solace_core::PlanId;

    use super::*;

    fn plan(tier: PlanTier, price: i64, currency: Currency) -> PricingPlan {
        PricingPlan {
            id: PlanId::generate(),
            tier,
            name: tier.to_string(),
            monthly_price: Decimal::from(price),
            currency,
            features: serde_json::json!([]),
            active: true,
        }
    }

    fn request(current: &str, new: &str, days_remaining: i64) -> ProrationRequest {
        ProrationRequest {
            current_plan: current.to_string(),
            new_plan: new.to_string(),
            days_remaining,
            total_days_in_period: 30,
        }
    }

    #[test]
    fn test_upgrade_quote() {
        let quote = ProrationQuote::between(
            &plan(PlanTier::Basic, 30, Currency::USD),
            &plan(PlanTier::Premium, 60, Currency::USD),
            15,
            30,
        )
        .unwrap();

        assert_eq!(quote.change, PlanChange::Upgrade);
        assert_eq!(quote.amount, Decimal::from(15));
    }

    #[test]
    fn test_downgrade_quote_is_refund() {
        let quote = ProrationQuote::between(
            &plan(PlanTier::Enterprise, 90, Currency::USD),
            &plan(PlanTier::Basic, 30, Currency::USD),
            10,
            30,
        )
        .unwrap();

        assert_eq!(quote.change, PlanChange::Downgrade);
        assert!(quote.amount.is_sign_negative());
    }

    #[test]
    fn test_mixed_currencies_rejected() {
        let result = ProrationQuote::between(
            &plan(PlanTier::Basic, 30, Currency::USD),
            &plan(PlanTier::Premium, 60, Currency::EUR),
            10,
            30,
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_empty_period_is_proration_error() {
        let result = ProrationQuote::between(
            &plan(PlanTier::Basic, 30, Currency::USD),
            &plan(PlanTier::Premium, 60, Currency::USD),
            0,
            0,
        );
        assert!(matches!(result, Err(AppError::Proration(_))));
    }

    #[test]
    fn test_request_tiers() {
        let (current, new) = request(" Basic ", "PREMIUM", 5).tiers().unwrap();
        assert_eq!(current, PlanTier::Basic);
        assert_eq!(new, PlanTier::Premium);

        assert!(request("basic", "platinum", 5).tiers().is_err());
        assert!(request("basic", "premium", -1).tiers().is_err());
        assert!(request("basic", "premium", 31).tiers().is_err());
    }
}
