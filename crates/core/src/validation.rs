//! Payment field validators and free-text sanitizing.
//!
//! Every validator takes a primitive input and returns `bool`. Invalid input
//! never panics and never errors; it simply yields `false`. Use
//! [`PaymentDetails::validate`] when the caller needs to know *which* field
//! failed.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Currency, Email};

/// Largest amount accepted for a single payment.
pub const MAX_PAYMENT_AMOUNT: f64 = 999_999.99;

/// Characters removed by [`sanitize_input`].
pub const STRIPPED_CHARACTERS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Whether `email` has the shape `local@domain.tld`.
///
/// Addresses longer than [`Email::MAX_LENGTH`] (254, the RFC 5321 limit)
/// are rejected even when they match the pattern.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    Email::parse(email).is_ok()
}

/// Whether `amount` is finite and within `(0, 999_999.99]`.
#[must_use]
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0 && amount <= MAX_PAYMENT_AMOUNT
}

/// Whether `currency` is a supported code, ignoring case.
#[must_use]
pub fn is_valid_currency(currency: &str) -> bool {
    currency.parse::<Currency>().is_ok()
}

/// Whether `card_number`, with all whitespace removed, is 13-19 digits.
///
/// No Luhn check is performed.
#[must_use]
pub fn is_valid_card_number(card_number: &str) -> bool {
    let digits = strip_whitespace(card_number);
    (13..=19).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a two-digit `month`/`year` expiry has not yet passed.
///
/// See [`is_valid_expiry_on`] for the exact rules.
#[must_use]
pub fn is_valid_expiry(month: &str, year: &str) -> bool {
    is_valid_expiry_on(month, year, Utc::now().date_naive())
}

/// Whether a two-digit `month`/`year` expiry is valid relative to `today`.
///
/// The month must be 1-12. The year is compared against `today`'s year
/// modulo 100, so a card expiring in "00" looks expired during 2099 and
/// a card expiring in "99" looks valid during 2100. That wraparound is
/// existing behavior and is kept as-is.
#[must_use]
pub fn is_valid_expiry_on(month: &str, year: &str, today: NaiveDate) -> bool {
    let (Some(month), Some(year)) = (parse_two_digits(month), parse_two_digits(year)) else {
        return false;
    };

    if !(1..=12).contains(&month) {
        return false;
    }

    let current_year = today.year().rem_euclid(100).unsigned_abs();
    let current_month = today.month();

    !(year < current_year || (year == current_year && month < current_month))
}

/// Whether `cvv` is 3 or 4 digits.
#[must_use]
pub fn is_valid_cvv(cvv: &str) -> bool {
    (3..=4).contains(&cvv.len()) && cvv.bytes().all(|b| b.is_ascii_digit())
}

/// Trim `input` and strip `< > " ' &`.
///
/// This is a blunt filter for free-text fields, not an HTML escaper: it does
/// not handle entities, attributes, or any other markup context.
#[must_use]
pub fn sanitize_input(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !STRIPPED_CHARACTERS.contains(c))
        .collect()
}

/// Last four digits of a card number, if it is a valid card number.
#[must_use]
pub fn card_last_four(card_number: &str) -> Option<String> {
    if !is_valid_card_number(card_number) {
        return None;
    }
    let digits = strip_whitespace(card_number);
    digits.get(digits.len() - 4..).map(str::to_owned)
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_two_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// =============================================================================
// Payment details
// =============================================================================

/// The field that failed payment validation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentValidationError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("amount must be greater than 0 and at most 999999.99")]
    InvalidAmount,
    #[error("unsupported currency")]
    UnsupportedCurrency,
    #[error("invalid card number")]
    InvalidCardNumber,
    #[error("card is expired or expiry date is invalid")]
    InvalidExpiry,
    #[error("invalid CVV")]
    InvalidCvv,
}

/// Card payment fields as submitted by the checkout form.
#[derive(Clone, Deserialize, Serialize)]
pub struct PaymentDetails {
    pub email: String,
    pub amount: f64,
    pub currency: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("email", &self.email)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("card_number", &"[REDACTED]")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

impl PaymentDetails {
    /// Validate every field against today's date.
    ///
    /// # Errors
    ///
    /// Returns the first failing field, checked in declaration order.
    pub fn validate(&self) -> Result<(), PaymentValidationError> {
        self.validate_on(Utc::now().date_naive())
    }

    /// Validate every field, checking expiry against `today`.
    ///
    /// # Errors
    ///
    /// Returns the first failing field, checked in declaration order.
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), PaymentValidationError> {
        if !is_valid_email(&self.email) {
            return Err(PaymentValidationError::InvalidEmail);
        }
        if !is_valid_amount(self.amount) {
            return Err(PaymentValidationError::InvalidAmount);
        }
        if !is_valid_currency(&self.currency) {
            return Err(PaymentValidationError::UnsupportedCurrency);
        }
        if !is_valid_card_number(&self.card_number) {
            return Err(PaymentValidationError::InvalidCardNumber);
        }
        if !is_valid_expiry_on(&self.expiry_month, &self.expiry_year, today) {
            return Err(PaymentValidationError::InvalidExpiry);
        }
        if !is_valid_cvv(&self.cvv) {
            return Err(PaymentValidationError::InvalidCvv);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn details() -> PaymentDetails {
        PaymentDetails {
            email: "client@example.com".to_string(),
            amount: 49.99,
            currency: "kes".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "30".to_string(),
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("client@example.com"));
        assert!(!is_valid_email("client@example"));
        assert!(!is_valid_email("client example.com"));
    }

    #[test]
    fn test_email_length_limit() {
        let domain = "@example.com";
        let at_limit = format!("{}{domain}", "a".repeat(Email::MAX_LENGTH - domain.len()));
        assert!(is_valid_email(&at_limit));

        let over_limit = format!("a{at_limit}");
        assert!(!is_valid_email(&over_limit));
    }

    #[test]
    fn test_amount_bounds() {
        assert!(!is_valid_amount(0.0));
        assert!(!is_valid_amount(-5.0));
        assert!(!is_valid_amount(1_000_000.0));
        assert!(!is_valid_amount(f64::NAN));
        assert!(!is_valid_amount(f64::INFINITY));
        assert!(is_valid_amount(500.5));
        assert!(is_valid_amount(0.01));
        assert!(is_valid_amount(999_999.99));
    }

    #[test]
    fn test_currency() {
        assert!(is_valid_currency("ugx"));
        assert!(is_valid_currency("ZAR"));
        assert!(!is_valid_currency("XYZ"));
        assert!(!is_valid_currency("CAD"));
    }

    #[test]
    fn test_card_number() {
        assert!(is_valid_card_number("4242424242424242"));
        assert!(is_valid_card_number("4242 4242 4242 4242"));
        assert!(is_valid_card_number("4222222222222")); // 13 digits
        assert!(is_valid_card_number("4242424242424242424")); // 19 digits
        assert!(!is_valid_card_number("424242424242")); // 12 digits
        assert!(!is_valid_card_number("42424242424242424242")); // 20 digits
        assert!(!is_valid_card_number("4242-4242-4242-4242"));
        assert!(!is_valid_card_number(""));
    }

    #[test]
    fn test_expiry_month_range() {
        let today = date(2026, 10, 16);
        assert!(!is_valid_expiry_on("0", "30", today));
        assert!(!is_valid_expiry_on("13", "30", today));
        assert!(is_valid_expiry_on("1", "30", today));
        assert!(is_valid_expiry_on("01", "30", today));
        assert!(!is_valid_expiry_on("ab", "30", today));
        assert!(!is_valid_expiry_on("12", "", today));
        assert!(!is_valid_expiry_on("012", "30", today));
    }

    #[test]
    fn test_expiry_relative_to_today() {
        let today = date(2026, 10, 16);
        assert!(is_valid_expiry_on("10", "26", today)); // current month is still valid
        assert!(is_valid_expiry_on("11", "26", today));
        assert!(!is_valid_expiry_on("09", "26", today));
        assert!(!is_valid_expiry_on("12", "25", today));
        assert!(is_valid_expiry_on("01", "27", today));
    }

    #[test]
    fn test_expiry_two_digit_year_wraps_at_century() {
        // "00" means 2100 to a card holder but compares as year 0.
        assert!(!is_valid_expiry_on("01", "00", date(2099, 6, 1)));
        assert!(is_valid_expiry_on("01", "99", date(2100, 6, 1)));
    }

    #[test]
    fn test_cvv() {
        assert!(is_valid_cvv("123"));
        assert!(is_valid_cvv("1234"));
        assert!(!is_valid_cvv("12"));
        assert!(!is_valid_cvv("12345"));
        assert!(!is_valid_cvv("12a"));
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(
            sanitize_input("<script>alert(\"x\")</script>"),
            "scriptalert(x)/script"
        );
        assert_eq!(sanitize_input("  Tom & Jerry's  "), "Tom  Jerrys");
        assert_eq!(sanitize_input("plain text"), "plain text");
        assert_eq!(sanitize_input("   "), "");
    }

    #[test]
    fn test_card_last_four() {
        assert_eq!(
            card_last_four("4242 4242 4242 1234"),
            Some("1234".to_string())
        );
        assert_eq!(card_last_four("1234"), None);
    }

    #[test]
    fn test_payment_details_validate() {
        let today = date(2026, 10, 16);
        assert_eq!(details().validate_on(today), Ok(()));

        let mut bad = details();
        bad.currency = "XYZ".to_string();
        assert_eq!(
            bad.validate_on(today),
            Err(PaymentValidationError::UnsupportedCurrency)
        );

        let mut bad = details();
        bad.amount = 0.0;
        bad.cvv = "1".to_string();
        assert_eq!(
            bad.validate_on(today),
            Err(PaymentValidationError::InvalidAmount)
        );

        let mut bad = details();
        bad.expiry_year = "20".to_string();
        assert_eq!(
            bad.validate_on(today),
            Err(PaymentValidationError::InvalidExpiry)
        );
    }

    #[test]
    fn test_payment_details_debug_redacts_card() {
        let debug = format!("{:?}", details());
        assert!(!debug.contains("4242"));
        assert!(debug.contains("[REDACTED]"));
    }
}
