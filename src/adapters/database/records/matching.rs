use crate::domain::conversation::Conversation;
use crate::domain::matching::Match;
use crate::domain::message::MessagePreview;
use crate::domain::user::UserSummary;
use crate::error::AppError;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct MatchRecord {
    pub(crate) id: Uuid,
    pub(crate) user_a: Uuid,
    pub(crate) user_b: Uuid,
    pub(crate) last_message_id: Option<Uuid>,
    pub(crate) last_message_at: Option<OffsetDateTime>,
    pub(crate) is_active: bool,
    pub(crate) created_at: OffsetDateTime,
}

impl TryFrom<MatchRecord> for Match {
    type Error = AppError;

    fn try_from(record: MatchRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            [record.user_a, record.user_b],
            record.last_message_id,
            record.last_message_at,
            record.is_active,
            record.created_at,
        )
    }
}

/// One active match joined with the other member, the latest message and the unread count.
#[derive(Debug, sqlx::FromRow)]
pub struct ConversationRecord {
    pub(crate) match_id: Uuid,
    pub(crate) matched_at: OffsetDateTime,
    pub(crate) last_message_at: Option<OffsetDateTime>,
    pub(crate) other_id: Uuid,
    pub(crate) other_name: String,
    pub(crate) other_age: Option<i32>,
    pub(crate) other_bio: String,
    pub(crate) other_photo_url: Option<String>,
    pub(crate) last_id: Option<Uuid>,
    pub(crate) last_content: Option<String>,
    pub(crate) last_sender_id: Option<Uuid>,
    pub(crate) last_status: Option<String>,
    pub(crate) last_created_at: Option<OffsetDateTime>,
    pub(crate) unread_count: i64,
}

impl TryFrom<ConversationRecord> for Conversation {
    type Error = AppError;

    fn try_from(record: ConversationRecord) -> Result<Self, Self::Error> {
        let last_message = match (
            record.last_id,
            record.last_content,
            record.last_sender_id,
            record.last_status,
            record.last_created_at,
        ) {
            (Some(id), Some(content), Some(sender_id), Some(status), Some(created_at)) => {
                Some(MessagePreview { id, content, sender_id, status: status.parse()?, created_at })
            }
            _ => None,
        };

        Ok(Self {
            match_id: record.match_id,
            user: UserSummary {
                id: record.other_id,
                name: record.other_name,
                age: record.other_age,
                bio: record.other_bio,
                photo: record.other_photo_url,
            },
            last_message,
            last_message_at: record.last_message_at,
            unread_count: record.unread_count,
            matched_at: record.matched_at,
        })
    }
}
