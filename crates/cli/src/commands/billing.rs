//! Billing arithmetic checks for support staff.
//!
//! # Usage
//!
//! ```bash
//! # Quote a mid-period plan change
//! solace-cli billing prorate --current-price 29.99 --new-price 59.99 \
//!     --days-remaining 12 --period-days 30
//!
//! # Show when a failed renewal will be retried
//! solace-cli billing retry --attempt 2
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use solace_core::subscription::{RetrySchedule, calculate_proration_amount};

use super::CliError;

/// Describe the proration for a plan change.
///
/// # Errors
///
/// Returns `CliError::Proration` for an empty period.
pub fn prorate(
    current_price: Decimal,
    new_price: Decimal,
    days_remaining: i64,
    period_days: i64,
) -> Result<String, CliError> {
    let amount = calculate_proration_amount(current_price, new_price, days_remaining, period_days)?;

    let direction = if amount.is_sign_negative() && !amount.is_zero() {
        "refund"
    } else {
        "charge"
    };
    Ok(format!(
        "{direction}: {} (exact: {amount})",
        amount.abs().round_dp(2)
    ))
}

/// Describe the retry schedule for a failed renewal attempt.
#[must_use]
pub fn retry(attempt: u32, now: DateTime<Utc>) -> String {
    let schedule = RetrySchedule::new(attempt, now);
    let mut summary = format!(
        "attempt {} of {}: retry at {}",
        schedule.attempt,
        schedule.max_retries,
        schedule.next_retry_date.to_rfc3339()
    );
    if schedule.is_final() {
        summary.push_str(" (final attempt)");
    }
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_prorate_upgrade_is_charge() {
        let summary = prorate(Decimal::from(30), Decimal::from(60), 15, 30).unwrap();
        assert!(summary.starts_with("charge: 15"));
    }

    #[test]
    fn test_prorate_downgrade_is_refund() {
        let summary = prorate(Decimal::from(60), Decimal::from(30), 10, 30).unwrap();
        assert!(summary.starts_with("refund: 10"));
    }

    #[test]
    fn test_prorate_empty_period() {
        assert!(matches!(
            prorate(Decimal::from(30), Decimal::from(60), 0, 0),
            Err(CliError::Proration(_))
        ));
    }

    #[test]
    fn test_retry_summary() {
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        assert_eq!(
            retry(1, now),
            "attempt 1 of 3: retry at 2026-10-02T00:00:00+00:00"
        );
        assert!(retry(3, now).ends_with("(final attempt)"));
    }
}
