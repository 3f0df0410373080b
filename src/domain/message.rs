use crate::domain::pagination::Pagination;
use crate::domain::user::UserSummary;
use crate::error::{AppError, Result};
use serde::Serialize;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Delivery lifecycle of a message. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Seen,
}

impl MessageStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Seen => "seen",
        }
    }

    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }

    /// Statuses a message may be in for a transition to `target` to apply.
    #[must_use]
    pub fn sources_for(target: Self) -> Vec<&'static str> {
        [Self::Sent, Self::Delivered, Self::Seen]
            .into_iter()
            .filter(|s| s.can_advance_to(target))
            .map(Self::as_str)
            .collect()
    }
}

impl FromStr for MessageStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "seen" => Ok(Self::Seen),
            other => {
                tracing::error!(status = %other, "Unknown message status in store");
                Err(AppError::Internal)
            }
        }
    }
}

/// Message text that has been trimmed and length-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// # Errors
    /// Returns `AppError::BadRequest` if the trimmed text is empty, contains a NUL character or is
    /// longer than `max_chars`.
    pub fn parse(raw: &str, max_chars: usize) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest("Message content is required".into()));
        }
        // Postgres text columns cannot hold U+0000.
        if trimmed.contains('\0') {
            return Err(AppError::BadRequest("Message content contains invalid characters".into()));
        }
        if trimmed.chars().count() > max_chars {
            return Err(AppError::BadRequest(format!("Message cannot exceed {max_chars} characters")));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `max_chars` characters, used for notification previews.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        self.0.chars().take(max_chars).collect()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub status: MessageStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub seen_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A message with its sender's summary, as shown in a chat window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: UserSummary,
}

/// The compact form of a match's latest message used in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePreview {
    pub id: Uuid,
    pub content: String,
    pub sender_id: Uuid,
    pub status: MessageStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePage {
    /// Oldest first.
    pub messages: Vec<MessageView>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_moves_forward() {
        use MessageStatus::{Delivered, Seen, Sent};

        assert!(Sent.can_advance_to(Delivered));
        assert!(Sent.can_advance_to(Seen));
        assert!(Delivered.can_advance_to(Seen));

        assert!(!Delivered.can_advance_to(Sent));
        assert!(!Seen.can_advance_to(Delivered));
        assert!(!Seen.can_advance_to(Sent));
        assert!(!Seen.can_advance_to(Seen));
    }

    #[test]
    fn test_transition_sources() {
        assert_eq!(MessageStatus::sources_for(MessageStatus::Delivered), vec!["sent"]);
        assert_eq!(MessageStatus::sources_for(MessageStatus::Seen), vec!["sent", "delivered"]);
        assert!(MessageStatus::sources_for(MessageStatus::Sent).is_empty());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("seen".parse::<MessageStatus>().unwrap(), MessageStatus::Seen);
        assert!(matches!("read".parse::<MessageStatus>(), Err(AppError::Internal)));
    }

    #[test]
    fn test_content_is_trimmed() {
        let content = MessageContent::parse("  hello  ", 1000).unwrap();
        assert_eq!(content.as_str(), "hello");
    }

    #[test]
    fn test_blank_content_rejected() {
        assert!(matches!(MessageContent::parse("   \n\t", 1000), Err(AppError::BadRequest(_))));
        assert!(matches!(MessageContent::parse("", 1000), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_nul_character_rejected() {
        assert!(matches!(MessageContent::parse("hi\u{0}there", 1000), Err(AppError::BadRequest(_))));
        assert!(matches!(MessageContent::parse("\0", 1000), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_length_limit_counts_characters() {
        assert!(MessageContent::parse(&"a".repeat(1000), 1000).is_ok());
        assert!(MessageContent::parse(&"a".repeat(1001), 1000).is_err());
        // Multi-byte characters count once each.
        assert!(MessageContent::parse(&"é".repeat(1000), 1000).is_ok());
        // Surrounding whitespace does not count against the limit.
        assert!(MessageContent::parse(&format!("  {}  ", "a".repeat(1000)), 1000).is_ok());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let content = MessageContent::parse(&"ü".repeat(80), 1000).unwrap();
        assert_eq!(content.preview(50).chars().count(), 50);
        assert_eq!(MessageContent::parse("short", 1000).unwrap().preview(50), "short");
    }
}
