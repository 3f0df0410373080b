use crate::domain::message::MessageView;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Events a client may emit over the gateway.
///
/// Frames are JSON text: `{"event": "join_match", "data": {"matchId": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    JoinMatch { match_id: Uuid },
    LeaveMatch { match_id: Uuid },
    SendMessage { match_id: Uuid, content: String },
    TypingStart { match_id: Uuid },
    TypingStop { match_id: Uuid },
    MarkSeen { match_id: Uuid },
}

impl ClientEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JoinMatch { .. } => "join_match",
            Self::LeaveMatch { .. } => "leave_match",
            Self::SendMessage { .. } => "send_message",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::MarkSeen { .. } => "mark_seen",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationSender {
    pub id: Uuid,
    pub name: String,
    pub photo: Option<String>,
}

/// Events the server pushes to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    JoinedMatch {
        match_id: Uuid,
    },
    NewMessage(MessageView),
    MessageDelivered {
        message_id: Uuid,
        match_id: Uuid,
    },
    MessagesSeen {
        match_id: Uuid,
        seen_by: Uuid,
        #[serde(with = "time::serde::rfc3339")]
        seen_at: OffsetDateTime,
    },
    MessageDeleted {
        match_id: Uuid,
        message_id: Uuid,
    },
    UserTyping {
        user_id: Uuid,
        match_id: Uuid,
        name: String,
    },
    UserStoppedTyping {
        user_id: Uuid,
        match_id: Uuid,
    },
    UserOnline {
        user_id: Uuid,
    },
    UserOffline {
        user_id: Uuid,
    },
    NewMessageNotification {
        match_id: Uuid,
        sender: NotificationSender,
        preview: String,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    #[must_use]
    pub fn error(err: &AppError) -> Self {
        Self::Error { message: err.client_message() }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JoinedMatch { .. } => "joined_match",
            Self::NewMessage(_) => "new_message",
            Self::MessageDelivered { .. } => "message_delivered",
            Self::MessagesSeen { .. } => "messages_seen",
            Self::MessageDeleted { .. } => "message_deleted",
            Self::UserTyping { .. } => "user_typing",
            Self::UserStoppedTyping { .. } => "user_stopped_typing",
            Self::UserOnline { .. } => "user_online",
            Self::UserOffline { .. } => "user_offline",
            Self::NewMessageNotification { .. } => "new_message_notification",
            Self::Error { .. } => "error",
        }
    }
}
