use crate::domain::pagination::Pagination;
use crate::domain::swipe::{IncomingLike, SwipeHistoryEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRequest {
    pub target_user_id: Option<Uuid>,
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Unrecognised values are ignored and the full history is returned.
    pub action: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SwipeHistory {
    pub swipes: Vec<SwipeHistoryEntry>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct IncomingLikes {
    pub likes: Vec<IncomingLike>,
    pub count: usize,
}
