use crate::domain::message::{Message, MessageView};
use crate::domain::user::UserSummary;
use crate::error::AppError;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct MessageRecord {
    pub(crate) id: Uuid,
    pub(crate) match_id: Uuid,
    pub(crate) sender_id: Uuid,
    pub(crate) content: String,
    pub(crate) status: String,
    pub(crate) seen_at: Option<OffsetDateTime>,
    pub(crate) created_at: OffsetDateTime,
}

impl TryFrom<MessageRecord> for Message {
    type Error = AppError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            match_id: record.match_id,
            sender_id: record.sender_id,
            content: record.content,
            status: record.status.parse()?,
            seen_at: record.seen_at,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct MessageViewRecord {
    #[sqlx(flatten)]
    pub(crate) message: MessageRecord,
    pub(crate) sender_name: String,
    pub(crate) sender_age: Option<i32>,
    pub(crate) sender_bio: String,
    pub(crate) sender_photo_url: Option<String>,
}

impl TryFrom<MessageViewRecord> for MessageView {
    type Error = AppError;

    fn try_from(record: MessageViewRecord) -> Result<Self, Self::Error> {
        let sender = UserSummary {
            id: record.message.sender_id,
            name: record.sender_name,
            age: record.sender_age,
            bio: record.sender_bio,
            photo: record.sender_photo_url,
        };
        Ok(Self { message: record.message.try_into()?, sender })
    }
}
