//! Database operations for pricing plans, subscriptions and payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use solace_core::subscription::PlanTier;
use solace_core::{Currency, PlanId, ProfileId, SubscriptionId, SubscriptionStatus};

use super::RepositoryError;
use crate::models::{Payment, PricingPlan, Subscription};

// =============================================================================
// Internal Row Types
// =============================================================================

fn parse_tier(raw: &str) -> Result<PlanTier, RepositoryError> {
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid plan tier in database: {e}")))
}

#[derive(Debug, sqlx::FromRow)]
struct PricingPlanRow {
    id: PlanId,
    tier: String,
    name: String,
    monthly_price: Decimal,
    currency: Currency,
    features: serde_json::Value,
    active: bool,
}

impl TryFrom<PricingPlanRow> for PricingPlan {
    type Error = RepositoryError;

    fn try_from(row: PricingPlanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tier: parse_tier(&row.tier)?,
            name: row.name,
            monthly_price: row.monthly_price,
            currency: row.currency,
            features: row.features,
            active: row.active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: SubscriptionId,
    profile_id: ProfileId,
    plan_tier: String,
    status: SubscriptionStatus,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
    retry_attempt: i32,
    next_retry_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = RepositoryError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            profile_id: row.profile_id,
            plan_tier: parse_tier(&row.plan_tier)?,
            status: row.status,
            current_period_start: row.current_period_start,
            current_period_end: row.current_period_end,
            retry_attempt: row.retry_attempt,
            next_retry_at: row.next_retry_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SUBSCRIPTION_COLUMNS: &str = "id, profile_id, plan_tier, status, current_period_start, \
                                    current_period_end, retry_attempt, next_retry_at, \
                                    created_at, updated_at";

// =============================================================================
// Pricing
// =============================================================================

/// Repository for pricing plans.
pub struct PricingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PricingRepository<'a> {
    /// Create a new pricing repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active plans, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored tier is unknown.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<PricingPlan>, RepositoryError> {
        let rows = sqlx::query_as::<_, PricingPlanRow>(
            r"
            SELECT id, tier, name, monthly_price, currency, features, active
            FROM pricing_plans
            WHERE active
            ORDER BY monthly_price ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PricingPlan::try_from).collect()
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Repository for subscriptions.
pub struct SubscriptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the most recent subscription for a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored tier is unknown.
    #[instrument(skip(self))]
    pub async fn get_for_profile(
        &self,
        profile_id: ProfileId,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE profile_id = $1 \
             ORDER BY created_at DESC \
             LIMIT 1"
        ))
        .bind(profile_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Subscription::try_from).transpose()
    }

    /// Get a subscription by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored tier is unknown.
    #[instrument(skip(self))]
    pub async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Subscription::try_from).transpose()
    }

    /// Move a subscription to another tier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the subscription does not exist.
    /// Returns `RepositoryError::Conflict` if no plan exists for the tier.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self))]
    pub async fn change_plan(
        &self,
        id: SubscriptionId,
        tier: PlanTier,
    ) -> Result<Subscription, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "UPDATE subscriptions \
             SET plan_tier = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(id)
        .bind(tier.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "no plan for tier"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Record a failed renewal.
    ///
    /// `expected_attempt` is the `retry_attempt` the caller read. The write
    /// only applies if it is still current, so two failures reported at the
    /// same time cannot both advance from the same count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the subscription is missing,
    /// already cancelled, or its `retry_attempt` changed since it was read.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn record_payment_failure(
        &self,
        id: SubscriptionId,
        expected_attempt: i32,
        retry_attempt: i32,
        next_retry_at: Option<DateTime<Utc>>,
        status: SubscriptionStatus,
    ) -> Result<Subscription, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "UPDATE subscriptions \
             SET retry_attempt = $3, next_retry_at = $4, status = $5, updated_at = NOW() \
             WHERE id = $1 AND retry_attempt = $2 AND status <> 'cancelled' \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(id)
        .bind(expected_attempt)
        .bind(retry_attempt)
        .bind(next_retry_at)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::Conflict("subscription was updated concurrently".to_owned())
        })?;

        row.try_into()
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Parameters for recording a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub email: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub card_last4: String,
    pub description: Option<String>,
}

/// Repository for payments.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, payment), fields(currency = %payment.currency))]
    pub async fn create(&self, payment: NewPayment) -> Result<Payment, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(
            r"
            INSERT INTO payments (email, amount, currency, card_last4, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, amount, currency, card_last4, description, status, created_at
            ",
        )
        .bind(&payment.email)
        .bind(payment.amount)
        .bind(payment.currency)
        .bind(&payment.card_last4)
        .bind(&payment.description)
        .fetch_one(self.pool)
        .await?;

        Ok(payment)
    }
}
