use crate::domain::user::{Identity, UserStatus, UserSummary};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct UserSummaryRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) age: Option<i32>,
    pub(crate) bio: String,
    pub(crate) photo_url: Option<String>,
}

impl From<UserSummaryRecord> for UserSummary {
    fn from(record: UserSummaryRecord) -> Self {
        Self { id: record.id, name: record.name, age: record.age, bio: record.bio, photo: record.photo_url }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserAccountRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) photo_url: Option<String>,
    pub(crate) is_verified: bool,
    pub(crate) is_active: bool,
    pub(crate) is_banned: bool,
}

impl From<UserAccountRecord> for (Identity, UserStatus) {
    fn from(record: UserAccountRecord) -> Self {
        let status = UserStatus {
            id: record.id,
            is_active: record.is_active,
            is_banned: record.is_banned,
            is_verified: record.is_verified,
        };
        let identity =
            Identity { user_id: record.id, name: record.name, photo: record.photo_url, is_verified: record.is_verified };
        (identity, status)
    }
}
