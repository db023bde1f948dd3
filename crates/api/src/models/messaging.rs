//! Messaging domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solace_core::{
    ConversationId, MessageId, MessageType, NotificationChannel, NotificationId, ProfileId,
};

/// A message in a two-party conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: ProfileId,
    pub recipient_id: ProfileId,
    /// Sanitized message body.
    pub content: String,
    pub message_type: MessageType,
    /// When the recipient read the message, if they have.
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The participant on the other side of the conversation from `me`.
    #[must_use]
    pub fn counterpart(&self, me: ProfileId) -> ProfileId {
        if self.sender_id == me {
            self.recipient_id
        } else {
            self.sender_id
        }
    }
}

/// One entry in a user's conversation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    /// The other participant.
    pub participant_id: ProfileId,
    /// Most recent message in the conversation.
    pub last_message: Message,
    /// Messages addressed to the requesting user that are still unread.
    pub unread_count: i64,
}

/// A notification addressed to a single profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: ProfileId,
    pub title: String,
    pub message: String,
    /// Free-form category (e.g. `session_reminder`, `billing`).
    pub notification_type: String,
    pub channel: NotificationChannel,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: ProfileId, recipient: ProfileId) -> Message {
        Message {
            id: MessageId::generate(),
            conversation_id: ConversationId::between(sender, recipient),
            sender_id: sender,
            recipient_id: recipient,
            content: "See you Thursday".to_string(),
            message_type: MessageType::Text,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_counterpart() {
        let client = ProfileId::generate();
        let therapist = ProfileId::generate();
        let msg = message(client, therapist);

        assert_eq!(msg.counterpart(client), therapist);
        assert_eq!(msg.counterpart(therapist), client);
    }

    #[test]
    fn test_message_serialization() {
        let msg = message(ProfileId::generate(), ProfileId::generate());
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("\"message_type\":\"text\""));
        assert!(json.contains("\"read_at\":null"));
        assert!(json.contains(&format!("\"conversation_id\":\"{}\"", msg.conversation_id)));
    }
}
