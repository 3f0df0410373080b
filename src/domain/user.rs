use serde::Serialize;
use uuid::Uuid;

/// Public profile summary attached to matches, swipes and message senders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub bio: String,
    /// Primary photo URL as stored by the object-storage provider.
    pub photo: Option<String>,
}

/// The account flags the core needs from the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStatus {
    pub id: Uuid,
    pub is_active: bool,
    pub is_banned: bool,
    pub is_verified: bool,
}

impl UserStatus {
    /// Inactive and banned users are indistinguishable from missing ones to other users.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        self.is_active && !self.is_banned
    }
}

/// An authenticated caller, resolved from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub name: String,
    pub photo: Option<String>,
    pub is_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(is_active: bool, is_banned: bool) -> UserStatus {
        UserStatus { id: Uuid::new_v4(), is_active, is_banned, is_verified: true }
    }

    #[test]
    fn test_reachability() {
        assert!(status(true, false).is_reachable());
        assert!(!status(false, false).is_reachable());
        assert!(!status(true, true).is_reachable());
        assert!(!status(false, true).is_reachable());
    }
}
