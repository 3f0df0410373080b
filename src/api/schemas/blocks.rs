use crate::domain::user::UserSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedUsers {
    pub blocked_users: Vec<UserSummary>,
    pub count: usize,
}
