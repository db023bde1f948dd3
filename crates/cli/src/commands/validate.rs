//! Quick checks of individual payment fields.
//!
//! # Usage
//!
//! ```bash
//! solace-cli validate card "4242 4242 4242 4242"
//! solace-cli validate email client@example.com
//! solace-cli validate currency kes
//! solace-cli validate expiry 09 27
//! ```

use solace_core::validation::{
    is_valid_card_number, is_valid_currency, is_valid_email, is_valid_expiry,
};

use super::CliError;

/// A field to check.
#[derive(Debug, Clone, clap::Subcommand)]
pub enum Field {
    /// Card number (13-19 digits, spaces allowed)
    Card { number: String },
    /// Email address
    Email { address: String },
    /// ISO 4217 currency code
    Currency { code: String },
    /// Two-digit expiry month and year
    Expiry { month: String, year: String },
}

/// Check a single field.
///
/// # Errors
///
/// Returns `CliError::Invalid` naming the field when it fails.
pub fn check(field: &Field) -> Result<(), CliError> {
    let (name, valid, value) = match field {
        Field::Card { number } => (
            "card number",
            is_valid_card_number(number),
            "[REDACTED]".to_string(),
        ),
        Field::Email { address } => ("email", is_valid_email(address), address.clone()),
        Field::Currency { code } => ("currency", is_valid_currency(code), code.clone()),
        Field::Expiry { month, year } => (
            "expiry",
            is_valid_expiry(month, year),
            format!("{month}/{year}"),
        ),
    };

    if valid {
        Ok(())
    } else {
        Err(CliError::Invalid { field: name, value })
    }
}
