//! Subscription billing helpers: payment retry schedules, proration and the
//! plan hierarchy.
//!
//! # Retry schedule
//!
//! Failed renewals are retried on a fixed backoff ladder of 1, 3 and 7 days.
//! Attempts are 1-based and attempts past the end of the ladder reuse the last
//! rung. After [`MAX_RETRIES`] attempts the subscription gives up.
//!
//! # Proration
//!
//! A mid-cycle plan change charges the new plan's daily rate and refunds the
//! current plan's daily rate for the remaining days. The result is signed
//! (positive = charge, negative = refund) and is never rounded here; rounding
//! to the currency's minor unit is the caller's job.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days to wait before each retry attempt, indexed by `attempt - 1`.
pub const RETRY_BACKOFF_DAYS: [i64; 3] = [1, 3, 7];

/// Number of retry attempts before a subscription is given up on.
pub const MAX_RETRIES: u32 = 3;

/// Plan tiers from lowest to highest.
pub const PLAN_HIERARCHY: [PlanTier; 3] = [PlanTier::Basic, PlanTier::Premium, PlanTier::Enterprise];

// =============================================================================
// Retry schedule
// =============================================================================

/// Backoff for a 1-based attempt number.
///
/// Attempt 0 is treated as attempt 1.
#[must_use]
pub fn retry_backoff(attempt: u32) -> Duration {
    let rung = usize::try_from(attempt.saturating_sub(1)).unwrap_or(usize::MAX);
    let days = RETRY_BACKOFF_DAYS
        .get(rung)
        .or_else(|| RETRY_BACKOFF_DAYS.last())
        .copied()
        .unwrap_or(1);
    Duration::days(days)
}

/// When the given attempt should run, counted from `now`.
#[must_use]
pub fn calculate_retry_date(attempt: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now + retry_backoff(attempt)
}

/// When the given attempt should run, counted from the current time.
#[must_use]
pub fn calculate_retry_date_from_now(attempt: u32) -> DateTime<Utc> {
    calculate_retry_date(attempt, Utc::now())
}

/// Whether `attempt` has used up the retry budget.
#[must_use]
pub const fn is_retry_limit_reached(attempt: u32) -> bool {
    attempt >= MAX_RETRIES
}

/// The next retry for a failed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySchedule {
    /// 1-based attempt number.
    pub attempt: u32,
    /// When this attempt should run.
    pub next_retry_date: DateTime<Utc>,
    /// Always [`MAX_RETRIES`].
    pub max_retries: u32,
}

impl RetrySchedule {
    /// Build the schedule for `attempt`, counted from `now`.
    #[must_use]
    pub fn new(attempt: u32, now: DateTime<Utc>) -> Self {
        Self {
            attempt,
            next_retry_date: calculate_retry_date(attempt, now),
            max_retries: MAX_RETRIES,
        }
    }

    /// Whether this is the last attempt that will be made.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        is_retry_limit_reached(self.attempt)
    }
}

/// Build the schedule for `attempt`, counted from the current time.
#[must_use]
pub fn create_retry_schedule(attempt: u32) -> RetrySchedule {
    RetrySchedule::new(attempt, Utc::now())
}

// =============================================================================
// Proration
// =============================================================================

/// Errors from [`calculate_proration_amount`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProrationError {
    /// The billing period has no days, so there is no daily rate.
    #[error("billing period must contain at least one day")]
    EmptyPeriod,
    /// Intermediate arithmetic exceeded the decimal range.
    #[error("proration amount overflowed")]
    Overflow,
}

/// Signed amount owed when switching plans mid-period.
///
/// `new_price / total_days * days_remaining - current_price / total_days * days_remaining`.
/// Positive means the customer is charged; negative means a refund is owed.
/// The result is not rounded and negative inputs are not rejected.
///
/// # Errors
///
/// Returns [`ProrationError::EmptyPeriod`] when `total_days_in_period` is zero
/// and [`ProrationError::Overflow`] if the arithmetic leaves the decimal range.
pub fn calculate_proration_amount(
    current_price: Decimal,
    new_price: Decimal,
    days_remaining: i64,
    total_days_in_period: i64,
) -> Result<Decimal, ProrationError> {
    if total_days_in_period == 0 {
        return Err(ProrationError::EmptyPeriod);
    }

    let total = Decimal::from(total_days_in_period);
    let remaining = Decimal::from(days_remaining);

    let current_daily = current_price
        .checked_div(total)
        .ok_or(ProrationError::Overflow)?;
    let new_daily = new_price.checked_div(total).ok_or(ProrationError::Overflow)?;

    let charge = new_daily
        .checked_mul(remaining)
        .ok_or(ProrationError::Overflow)?;
    let refund = current_daily
        .checked_mul(remaining)
        .ok_or(ProrationError::Overflow)?;

    charge.checked_sub(refund).ok_or(ProrationError::Overflow)
}

// =============================================================================
// Plan hierarchy
// =============================================================================

/// Returned when a plan name is not part of the hierarchy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown plan: {0}")]
pub struct UnknownPlan(pub String);

/// A subscription tier. Ordering follows [`PLAN_HIERARCHY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Basic,
    Premium,
    Enterprise,
}

impl PlanTier {
    /// Position in [`PLAN_HIERARCHY`], lowest first.
    #[must_use]
    pub const fn rank(self) -> usize {
        match self {
            Self::Basic => 0,
            Self::Premium => 1,
            Self::Enterprise => 2,
        }
    }

    /// Lower-case plan name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanTier {
    type Err = UnknownPlan;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        PLAN_HIERARCHY
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownPlan(s.to_owned()))
    }
}

/// Direction of a plan change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanChange {
    Upgrade,
    Downgrade,
    Unchanged,
}

impl PlanChange {
    /// Direction of a move from `current` to `new`.
    #[must_use]
    pub fn between(current: PlanTier, new: PlanTier) -> Self {
        match new.cmp(&current) {
            core::cmp::Ordering::Greater => Self::Upgrade,
            core::cmp::Ordering::Less => Self::Downgrade,
            core::cmp::Ordering::Equal => Self::Unchanged,
        }
    }
}

/// Classify a move from `current` to `new`.
///
/// Returns `None` if either name is not a known plan.
#[must_use]
pub fn classify_plan_change(current: &str, new: &str) -> Option<PlanChange> {
    let current: PlanTier = current.parse().ok()?;
    let new: PlanTier = new.parse().ok()?;
    Some(PlanChange::between(current, new))
}

/// Whether moving from `current` to `new` goes up the hierarchy.
///
/// Unknown plan names are rejected (`false`).
#[must_use]
pub fn validate_plan_upgrade(current: &str, new: &str) -> bool {
    classify_plan_change(current, new) == Some(PlanChange::Upgrade)
}

/// Whether moving from `current` to `new` goes down the hierarchy.
///
/// Unknown plan names are rejected (`false`).
#[must_use]
pub fn validate_plan_downgrade(current: &str, new: &str) -> bool {
    classify_plan_change(current, new) == Some(PlanChange::Downgrade)
}
