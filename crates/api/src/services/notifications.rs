//! Notification forwarding.
//!
//! Every notification is stored first, then handed to the dispatcher. In-app
//! notifications are done once stored. Email, SMS and push have no provider
//! wired up yet: the dispatcher records that in the logs and reports
//! [`DeliveryStatus::NotConfigured`] so callers can see nothing was sent.

use serde::Serialize;
use tracing::instrument;

use solace_core::NotificationChannel;

use crate::models::Notification;

/// What happened to a notification after it was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Visible in the recipient's in-app feed.
    Stored,
    /// The channel has no delivery provider; only the stored copy exists.
    NotConfigured,
}

/// Forwards notifications to their delivery channel.
#[derive(Debug, Clone, Default)]
pub struct NotificationDispatcher;

impl NotificationDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Forward a stored notification.
    #[instrument(skip(self, notification), fields(notification_id = %notification.id, channel = ?notification.channel))]
    pub async fn dispatch(&self, notification: &Notification) -> DeliveryStatus {
        let status = Self::status_for(notification.channel);
        match status {
            DeliveryStatus::Stored => {
                tracing::debug!(user_id = %notification.user_id, "In-app notification stored");
            }
            DeliveryStatus::NotConfigured => {
                tracing::warn!(
                    user_id = %notification.user_id,
                    "No delivery provider for channel, notification kept in-app only"
                );
            }
        }
        status
    }

    const fn status_for(channel: NotificationChannel) -> DeliveryStatus {
        match channel {
            NotificationChannel::InApp => DeliveryStatus::Stored,
            NotificationChannel::Email | NotificationChannel::Sms | NotificationChannel::Push => {
                DeliveryStatus::NotConfigured
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use solace_core::{NotificationId, ProfileId};

    use super::*;

    fn notification(channel: NotificationChannel) -> Notification {
        Notification {
            id: NotificationId::generate(),
            user_id: ProfileId::generate(),
            title: "Session reminder".to_string(),
            message: "Your session starts in 1 hour".to_string(),
            notification_type: "session_reminder".to_string(),
            channel,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_in_app_is_stored() {
        let dispatcher = NotificationDispatcher::new();
        let status = dispatcher
            .dispatch(&notification(NotificationChannel::InApp))
            .await;
        assert_eq!(status, DeliveryStatus::Stored);
    }

    #[tokio::test]
    async fn test_external_channels_are_not_configured() {
        let dispatcher = NotificationDispatcher::new();
        for channel in [
            NotificationChannel::Email,
            NotificationChannel::Sms,
            NotificationChannel::Push,
        ] {
            assert_eq!(
                dispatcher.dispatch(&notification(channel)).await,
                DeliveryStatus::NotConfigured
            );
        }
    }

    #[test]
    fn test_delivery_status_serialization() {
        let json = serde_json::to_string(&DeliveryStatus::NotConfigured).expect("serialize");
        assert_eq!(json, "\"not_configured\"");
    }
}
