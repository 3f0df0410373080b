use crate::domain::swipe::{IncomingLike, Swipe, SwipeHistoryEntry};
use crate::domain::user::UserSummary;
use crate::error::AppError;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct SwipeRecord {
    pub(crate) id: Uuid,
    pub(crate) swiper_id: Uuid,
    pub(crate) swiped_id: Uuid,
    pub(crate) action: String,
    pub(crate) created_at: OffsetDateTime,
}

impl TryFrom<SwipeRecord> for Swipe {
    type Error = AppError;

    fn try_from(record: SwipeRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            swiper_id: record.swiper_id,
            swiped_id: record.swiped_id,
            action: record.action.parse().map_err(|_| AppError::Internal)?,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct SwipeHistoryRecord {
    pub(crate) id: Uuid,
    pub(crate) action: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) user_id: Uuid,
    pub(crate) name: String,
    pub(crate) age: Option<i32>,
    pub(crate) bio: String,
    pub(crate) photo_url: Option<String>,
}

impl TryFrom<SwipeHistoryRecord> for SwipeHistoryEntry {
    type Error = AppError;

    fn try_from(record: SwipeHistoryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            action: record.action.parse().map_err(|_| AppError::Internal)?,
            user: UserSummary {
                id: record.user_id,
                name: record.name,
                age: record.age,
                bio: record.bio,
                photo: record.photo_url,
            },
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct IncomingLikeRecord {
    pub(crate) swipe_id: Uuid,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) user_id: Uuid,
    pub(crate) name: String,
    pub(crate) age: Option<i32>,
    pub(crate) bio: String,
    pub(crate) photo_url: Option<String>,
}

impl From<IncomingLikeRecord> for IncomingLike {
    fn from(record: IncomingLikeRecord) -> Self {
        Self {
            swipe_id: record.swipe_id,
            user: UserSummary {
                id: record.user_id,
                name: record.name,
                age: record.age,
                bio: record.bio,
                photo: record.photo_url,
            },
            liked_at: record.created_at,
        }
    }
}
