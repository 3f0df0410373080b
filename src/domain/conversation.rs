use crate::domain::message::MessagePreview;
use crate::domain::user::UserSummary;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Read-side view of an active match for the chat list. Computed per request, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub match_id: Uuid,
    pub user: UserSummary,
    pub last_message: Option<MessagePreview>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_at: Option<OffsetDateTime>,
    /// Messages from the other member not yet seen by the caller.
    pub unread_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub matched_at: OffsetDateTime,
}
