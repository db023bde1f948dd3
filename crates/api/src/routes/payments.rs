//! Card payment intake.
//!
//! Payments are validated and recorded as `pending`. Only the last four card
//! digits are kept; the number and CVV are dropped after validation.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::validation::{PaymentDetails, card_last_four, sanitize_input};
use solace_core::{Currency, PaymentValidationError};

use crate::db::PaymentRepository;
use crate::db::billing::NewPayment;
use crate::error::{ApiJson, Result};
use crate::models::Payment;
use crate::state::AppState;

/// Body of `POST /api/payments`.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    #[serde(flatten)]
    pub details: PaymentDetails,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreatePaymentRequest {
    /// Validate the card details and reduce them to what gets stored.
    ///
    /// # Errors
    ///
    /// Returns the first failing field as `PaymentValidationError`.
    pub fn into_new_payment(self) -> std::result::Result<NewPayment, PaymentValidationError> {
        let details = self.details;
        details.validate()?;

        let currency: Currency = details
            .currency
            .parse()
            .map_err(|_| PaymentValidationError::UnsupportedCurrency)?;
        let amount = Decimal::try_from(details.amount)
            .map_err(|_| PaymentValidationError::InvalidAmount)?
            .round_dp(2);
        let card_last4 =
            card_last_four(&details.card_number).ok_or(PaymentValidationError::InvalidCardNumber)?;

        Ok(NewPayment {
            email: details.email.trim().to_lowercase(),
            amount,
            currency,
            card_last4,
            description: self
                .description
                .map(|d| sanitize_input(&d))
                .filter(|d| !d.is_empty()),
        })
    }
}

/// Response of `POST /api/payments`.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub payment: Payment,
}

/// Validate and record a card payment.
#[instrument(skip(state, request), fields(currency = %request.details.currency))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>)> {
    let new_payment = request.into_new_payment()?;
    let payment = PaymentRepository::new(state.pool())
        .create(new_payment)
        .await?;

    tracing::info!(payment_id = %payment.id, amount = %payment.amount, "Payment recorded");

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            success: true,
            payment,
        }),
    ))
}
