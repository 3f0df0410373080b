use crate::domain::conversation::Conversation;
use crate::domain::message::MessagePreview;
use crate::domain::user::UserSummary;
use crate::error::{AppError, Result};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A mutual like between two distinct users. Never deleted, only deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub user_ids: [Uuid; 2],
    pub last_message_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_at: Option<OffsetDateTime>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Match {
    /// Builds a match, rejecting degenerate pairs.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if both ids are the same user.
    pub fn new(
        id: Uuid,
        user_ids: [Uuid; 2],
        last_message_id: Option<Uuid>,
        last_message_at: Option<OffsetDateTime>,
        is_active: bool,
        created_at: OffsetDateTime,
    ) -> Result<Self> {
        if user_ids[0] == user_ids[1] {
            tracing::error!(match_id = %id, "Match row references the same user twice");
            return Err(AppError::Internal);
        }
        Ok(Self { id, user_ids, last_message_id, last_message_at, is_active, created_at })
    }

    #[must_use]
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.user_ids.contains(&user_id)
    }

    /// The member that is not `user_id`, or `None` if `user_id` is not a member.
    #[must_use]
    pub fn other_member(&self, user_id: Uuid) -> Option<Uuid> {
        match self.user_ids {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }

    /// Membership check for read access, regardless of whether the match is still active.
    ///
    /// # Errors
    /// Returns `AppError::Forbidden` if `user_id` is not a member.
    pub fn ensure_member(&self, user_id: Uuid) -> Result<()> {
        if self.is_member(user_id) { Ok(()) } else { Err(AppError::Forbidden("Access denied".into())) }
    }

    /// Membership check for chat operations, which require an active match.
    ///
    /// # Errors
    /// Returns `AppError::Forbidden` if the match is inactive or `user_id` is not a member.
    pub fn ensure_active_member(&self, user_id: Uuid) -> Result<()> {
        if !self.is_active {
            return Err(AppError::Forbidden("This match is no longer active".into()));
        }
        self.ensure_member(user_id)
    }
}

/// A match together with both users' public summaries, returned when a match forms.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    #[serde(flatten)]
    pub record: Match,
    pub users: Vec<UserSummary>,
}

/// A match from one member's point of view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOverview {
    pub match_id: Uuid,
    pub user: UserSummary,
    pub last_message: Option<MessagePreview>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Conversation> for MatchOverview {
    fn from(conversation: Conversation) -> Self {
        Self {
            match_id: conversation.match_id,
            user: conversation.user,
            last_message: conversation.last_message,
            last_message_at: conversation.last_message_at,
            created_at: conversation.matched_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCheck {
    pub is_matched: bool,
    pub match_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(is_active: bool) -> (Match, Uuid, Uuid) {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let m = Match::new(Uuid::new_v4(), [a, b], None, None, is_active, OffsetDateTime::now_utc()).unwrap();
        (m, a, b)
    }

    #[test]
    fn test_same_user_twice_is_rejected() {
        let a = Uuid::new_v4();
        assert!(Match::new(Uuid::new_v4(), [a, a], None, None, true, OffsetDateTime::now_utc()).is_err());
    }

    #[test]
    fn test_other_member() {
        let (m, a, b) = sample(true);
        assert_eq!(m.other_member(a), Some(b));
        assert_eq!(m.other_member(b), Some(a));
        assert_eq!(m.other_member(Uuid::new_v4()), None);
    }

    #[test]
    fn test_active_member_checks() {
        let (active, a, _) = sample(true);
        assert!(active.ensure_active_member(a).is_ok());
        assert!(matches!(active.ensure_active_member(Uuid::new_v4()), Err(AppError::Forbidden(_))));

        let (inactive, a, _) = sample(false);
        assert!(matches!(inactive.ensure_active_member(a), Err(AppError::Forbidden(_))));
        assert!(inactive.ensure_member(a).is_ok());
    }

    #[test]
    fn test_serialized_shape() {
        let (m, a, b) = sample(true);
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["userIds"], serde_json::json!([a, b]));
        assert_eq!(value["isActive"], true);
        assert!(value["lastMessageId"].is_null());
        assert!(value["lastMessageAt"].is_null());
    }
}
