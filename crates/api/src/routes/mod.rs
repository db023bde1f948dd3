//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness
//! GET  /health/ready                            - Readiness (database)
//!
//! # Messaging functions
//! POST /functions/send-message                  - Store a message
//! POST /functions/get-conversations             - Conversation list with unread counts
//! POST /functions/send-notification             - Store and forward a notification
//! GET  /api/conversations/{id}/messages         - Thread, oldest first
//! POST /api/conversations/{id}/read             - Mark thread read for a user
//!
//! # Calendar
//! GET    /api/sessions?profile_id=              - Sessions for a profile
//! POST   /api/sessions                          - Schedule
//! PATCH  /api/sessions/{id}                     - Reschedule / change status
//! DELETE /api/sessions/{id}                     - Remove
//!
//! # Documents
//! GET    /api/documents?owner_id=               - Documents for a profile
//! POST   /api/documents                         - Record uploaded document
//! DELETE /api/documents/{id}                    - Forget document
//!
//! # Feedback
//! GET  /api/feedback?profile_id=                - Feedback by a profile
//! POST /api/feedback                            - Submit feedback
//!
//! # Workshops
//! GET    /api/workshops                         - Upcoming workshops
//! POST   /api/workshops/{id}/register           - Take a seat
//! DELETE /api/workshops/{id}/register/{profile} - Give up a seat
//!
//! # Billing
//! GET  /api/pricing/plans                       - Active plans (cached)
//! POST /api/pricing/proration                   - Plan change quote
//! GET  /api/subscriptions/{profile_id}          - Current subscription
//! POST /api/subscriptions/{id}/change-plan      - Upgrade / downgrade
//! POST /api/subscriptions/{id}/payment-failed   - Schedule renewal retry
//! POST /api/payments                            - Record a card payment
//! ```

pub mod calendar;
pub mod documents;
pub mod feedback;
pub mod functions;
pub mod payments;
pub mod pricing;
pub mod subscriptions;
pub mod workshops;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the messaging function routes router.
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/send-message", post(functions::send_message))
        .route("/get-conversations", post(functions::get_conversations))
        .route("/send-notification", post(functions::send_notification))
}

/// Create the conversation routes router.
pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/{conversation_id}/messages", get(functions::list_thread))
        .route("/{conversation_id}/read", post(functions::mark_read))
}

/// Create the calendar routes router.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(calendar::list).post(calendar::create))
        .route("/{id}", patch(calendar::update).delete(calendar::delete))
}

/// Create the document routes router.
pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list).post(documents::create))
        .route("/{id}", delete(documents::delete))
}

/// Create the workshop routes router.
pub fn workshop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(workshops::list))
        .route("/{id}/register", post(workshops::register))
        .route("/{id}/register/{profile_id}", delete(workshops::unregister))
}

/// Create the billing routes router.
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/plans", get(pricing::plans))
        .route("/api/pricing/proration", post(pricing::proration))
        // `{id}` is the profile ID here; the segment name must match the routes below
        .route("/api/subscriptions/{id}", get(subscriptions::get_for_profile))
        .route(
            "/api/subscriptions/{id}/change-plan",
            post(subscriptions::change_plan),
        )
        .route(
            "/api/subscriptions/{id}/payment-failed",
            post(subscriptions::payment_failed),
        )
        .route("/api/payments", post(payments::create))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/functions", function_routes())
        .nest("/api/conversations", conversation_routes())
        .nest("/api/sessions", session_routes())
        .nest("/api/documents", document_routes())
        .route("/api/feedback", get(feedback::list).post(feedback::submit))
        .nest("/api/workshops", workshop_routes())
        .merge(billing_routes())
}
