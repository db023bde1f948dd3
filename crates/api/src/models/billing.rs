//! Pricing plans, subscriptions and payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use solace_core::subscription::PlanTier;
use solace_core::{
    Currency, PaymentId, PaymentStatus, PlanId, ProfileId, SubscriptionId, SubscriptionStatus,
};

/// A plan offered on the pricing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPlan {
    pub id: PlanId,
    pub tier: PlanTier,
    pub name: String,
    pub monthly_price: Decimal,
    pub currency: Currency,
    /// Feature bullet points shown on the pricing page.
    pub features: serde_json::Value,
    pub active: bool,
}

/// A profile's subscription to a plan tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub profile_id: ProfileId,
    pub plan_tier: PlanTier,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    /// Failed renewal attempts so far in this period.
    pub retry_attempt: i32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whole days in the current billing period.
    #[must_use]
    pub fn period_days(&self) -> i64 {
        (self.current_period_end - self.current_period_start).num_days()
    }

    /// Whole days left in the current period as of `now`, within
    /// `0..=period_days()`.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.current_period_end - now)
            .num_days()
            .min(self.period_days())
            .max(0)
    }
}

/// A recorded card payment. Only the last four card digits are kept.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: PaymentId,
    pub email: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub card_last4: String,
    pub description: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn subscription(start: &str, end: &str) -> Subscription {
        Subscription {
            id: SubscriptionId::generate(),
            profile_id: ProfileId::generate(),
            plan_tier: PlanTier::Basic,
            status: SubscriptionStatus::Active,
            current_period_start: start.parse().unwrap(),
            current_period_end: end.parse().unwrap(),
            retry_attempt: 0,
            next_retry_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_period_days() {
        let sub = subscription("2026-10-01T00:00:00Z", "2026-10-31T00:00:00Z");
        assert_eq!(sub.period_days(), 30);
    }

    #[test]
    fn test_days_remaining() {
        let sub = subscription("2026-10-01T00:00:00Z", "2026-10-31T00:00:00Z");
        assert_eq!(sub.days_remaining("2026-10-16T00:00:00Z".parse().unwrap()), 15);
        assert_eq!(sub.days_remaining("2026-11-05T00:00:00Z".parse().unwrap()), 0);
    }

    #[test]
    fn test_days_remaining_before_period_starts() {
        let sub = subscription("2026-11-01T00:00:00Z", "2026-12-01T00:00:00Z");
        assert_eq!(sub.days_remaining("2026-10-16T00:00:00Z".parse().unwrap()), 30);
    }
}
