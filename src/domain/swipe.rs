use crate::domain::matching::MatchDetails;
use crate::domain::user::UserSummary;
use crate::error::AppError;
use serde::Serialize;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Pass,
}

impl SwipeAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Pass => "pass",
        }
    }
}

impl FromStr for SwipeAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "pass" => Ok(Self::Pass),
            _ => Err(AppError::BadRequest("Action must be like or pass".into())),
        }
    }
}

/// One immutable like/pass decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swipe {
    pub id: Uuid,
    pub swiper_id: Uuid,
    pub swiped_id: Uuid,
    pub action: SwipeAction,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Swipe {
    #[must_use]
    pub const fn is_like(&self) -> bool {
        matches!(self.action, SwipeAction::Like)
    }
}

/// A swipe in the caller's history, joined with the swiped user's summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeHistoryEntry {
    pub id: Uuid,
    pub action: SwipeAction,
    pub user: UserSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Someone who liked the caller and is still waiting for a decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingLike {
    pub swipe_id: Uuid,
    pub user: UserSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub liked_at: OffsetDateTime,
}

/// Result of recording a swipe and evaluating it for reciprocity.
#[derive(Debug, Clone, Serialize)]
pub struct SwipeOutcome {
    pub matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub details: Option<MatchDetails>,
    /// True only when this swipe created the match row.
    #[serde(skip)]
    pub created: bool,
}

impl SwipeOutcome {
    #[must_use]
    pub const fn no_match() -> Self {
        Self { matched: false, details: None, created: false }
    }

    #[must_use]
    pub const fn matched(details: MatchDetails, created: bool) -> Self {
        Self { matched: true, details: Some(details), created }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!("like".parse::<SwipeAction>().unwrap(), SwipeAction::Like);
        assert_eq!("pass".parse::<SwipeAction>().unwrap(), SwipeAction::Pass);
        assert!(matches!("superlike".parse::<SwipeAction>(), Err(AppError::BadRequest(_))));
        assert!("LIKE".parse::<SwipeAction>().is_err());
    }

    #[test]
    fn test_no_match_serializes_without_match_key() {
        let value = serde_json::to_value(SwipeOutcome::no_match()).unwrap();
        assert_eq!(value, serde_json::json!({ "matched": false }));
    }
}
