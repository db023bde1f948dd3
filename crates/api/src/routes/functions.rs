//! Messaging functions called directly by the mobile and web clients.
//!
//! These keep the `/functions/*` paths and `{"success": true, ...}` bodies the
//! clients already depend on.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::validation::sanitize_input;
use solace_core::{ConversationId, MessageType, NotificationChannel, ProfileId};

use crate::db::messages::NewMessage;
use crate::db::notifications::NewNotification;
use crate::db::{MessageRepository, NotificationRepository};
use crate::error::{ApiJson, ApiPath, ApiQuery, AppError, Result};
use crate::models::{ConversationSummary, Message, Notification};
use crate::services::DeliveryStatus;
use crate::state::AppState;

/// Default page size for a conversation thread.
pub const DEFAULT_THREAD_LIMIT: i64 = 50;
/// Largest page size a client may ask for.
pub const MAX_THREAD_LIMIT: i64 = 200;

const DEFAULT_NOTIFICATION_TYPE: &str = "general";

// =============================================================================
// Send message
// =============================================================================

/// Body of `POST /functions/send-message`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: ProfileId,
    pub recipient_id: ProfileId,
    pub content: String,
    #[serde(default)]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
}

impl SendMessageRequest {
    /// Sanitize the content and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the sender writes to themselves or the
    /// content is empty once sanitized.
    pub fn into_new_message(self) -> Result<NewMessage> {
        if self.sender_id == self.recipient_id {
            return Err(AppError::BadRequest(
                "sender and recipient must be different".to_string(),
            ));
        }

        let content = sanitize_input(&self.content);
        if content.is_empty() {
            return Err(AppError::BadRequest("content must not be empty".to_string()));
        }

        let conversation_id = self
            .conversation_id
            .filter(|id| !id.as_str().trim().is_empty())
            .unwrap_or_else(|| ConversationId::between(self.sender_id, self.recipient_id));

        Ok(NewMessage {
            conversation_id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            content,
            message_type: self.message_type.unwrap_or_default(),
        })
    }
}

/// Response of `POST /functions/send-message`.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: Message,
}

/// Store a message between two profiles.
#[instrument(skip(state, request), fields(sender_id = %request.sender_id, recipient_id = %request.recipient_id))]
pub async fn send_message(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    let new_message = request.into_new_message()?;
    let message = MessageRepository::new(state.pool())
        .create(new_message)
        .await?;

    tracing::info!(
        message_id = %message.id,
        conversation_id = %message.conversation_id,
        "Message sent"
    );

    Ok(Json(SendMessageResponse {
        success: true,
        message,
    }))
}

// =============================================================================
// Conversations
// =============================================================================

/// Body of `POST /functions/get-conversations`.
#[derive(Debug, Deserialize)]
pub struct GetConversationsRequest {
    pub user_id: ProfileId,
}

/// Response of `POST /functions/get-conversations`.
#[derive(Debug, Serialize)]
pub struct GetConversationsResponse {
    pub success: bool,
    pub conversations: Vec<ConversationSummary>,
}

/// List the caller's conversations with their latest message and unread count.
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn get_conversations(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GetConversationsRequest>,
) -> Result<Json<GetConversationsResponse>> {
    let conversations = MessageRepository::new(state.pool())
        .list_conversations(request.user_id)
        .await?;

    Ok(Json(GetConversationsResponse {
        success: true,
        conversations,
    }))
}

/// Query of `GET /api/conversations/{conversation_id}/messages`.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    pub limit: Option<i64>,
}

impl ThreadQuery {
    /// Requested page size, clamped to `1..=MAX_THREAD_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_THREAD_LIMIT)
            .clamp(1, MAX_THREAD_LIMIT)
    }
}

/// Response of `GET /api/conversations/{conversation_id}/messages`.
#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub success: bool,
    pub messages: Vec<Message>,
}

/// Most recent messages of one conversation, oldest first.
#[instrument(skip(state))]
pub async fn list_thread(
    State(state): State<AppState>,
    ApiPath(conversation_id): ApiPath<ConversationId>,
    ApiQuery(query): ApiQuery<ThreadQuery>,
) -> Result<Json<ThreadResponse>> {
    let messages = MessageRepository::new(state.pool())
        .list_thread(&conversation_id, query.limit())
        .await?;

    Ok(Json(ThreadResponse {
        success: true,
        messages,
    }))
}

/// Body of `POST /api/conversations/{conversation_id}/read`.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub user_id: ProfileId,
}

/// Response of `POST /api/conversations/{conversation_id}/read`.
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: u64,
}

/// Mark the messages addressed to `user_id` in a conversation as read.
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn mark_read(
    State(state): State<AppState>,
    ApiPath(conversation_id): ApiPath<ConversationId>,
    ApiJson(request): ApiJson<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>> {
    let updated = MessageRepository::new(state.pool())
        .mark_read(&conversation_id, request.user_id)
        .await?;

    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

// =============================================================================
// Notifications
// =============================================================================

/// Body of `POST /functions/send-notification`.
#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    pub user_id: ProfileId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub channel: Option<NotificationChannel>,
}

impl SendNotificationRequest {
    /// Sanitize the text fields and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the title or message is empty once
    /// sanitized.
    pub fn into_new_notification(self) -> Result<NewNotification> {
        let title = sanitize_input(&self.title);
        if title.is_empty() {
            return Err(AppError::BadRequest("title must not be empty".to_string()));
        }
        let message = sanitize_input(&self.message);
        if message.is_empty() {
            return Err(AppError::BadRequest("message must not be empty".to_string()));
        }

        let notification_type = self
            .notification_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_TYPE.to_string());

        Ok(NewNotification {
            user_id: self.user_id,
            title,
            message,
            notification_type,
            channel: self.channel.unwrap_or_default(),
        })
    }
}

/// Response of `POST /functions/send-notification`.
#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub notification: Notification,
    pub delivery: DeliveryStatus,
}

/// Store a notification and forward it to its channel.
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn send_notification(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    let new_notification = request.into_new_notification()?;
    let notification = NotificationRepository::new(state.pool())
        .create(new_notification)
        .await?;

    let delivery = state.notifications().dispatch(&notification).await;

    Ok(Json(SendNotificationResponse {
        success: true,
        notification,
        delivery,
    }))
}
