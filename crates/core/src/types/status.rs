//! Status enums for various entities.
//!
//! Each enum maps onto a `PostgreSQL` enum type of the same name (with the
//! `postgres` feature) and serializes as `snake_case` in JSON.

use serde::{Deserialize, Serialize};

/// Kind of payload carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "message_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    System,
}

/// Lifecycle of a scheduled therapy session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "session_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    /// Whether the session can still move to another status.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

/// Billing state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "subscription_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    PastDue,
    Cancelled,
    Trialing,
}

/// Outcome of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

/// Where a notification should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "notification_channel", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    #[default]
    InApp,
    Email,
    Sms,
    Push,
}

/// Role of a profile within the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Client,
    Therapist,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Therapist => write!(f, "therapist"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_serialization() {
        let json = serde_json::to_string(&SessionStatus::NoShow).expect("serialize");
        assert_eq!(json, "\"no_show\"");

        let json = serde_json::to_string(&SubscriptionStatus::PastDue).expect("serialize");
        assert_eq!(json, "\"past_due\"");

        let json = serde_json::to_string(&NotificationChannel::InApp).expect("serialize");
        assert_eq!(json, "\"in_app\"");
    }

    #[test]
    fn test_message_type_defaults_to_text() {
        assert_eq!(MessageType::default(), MessageType::Text);
        let parsed: MessageType = serde_json::from_str("\"image\"").expect("deserialize");
        assert_eq!(parsed, MessageType::Image);
    }

    #[test]
    fn test_only_scheduled_sessions_are_open() {
        assert!(SessionStatus::Scheduled.is_open());
        assert!(!SessionStatus::Completed.is_open());
        assert!(!SessionStatus::Cancelled.is_open());
        assert!(!SessionStatus::NoShow.is_open());
    }
}
