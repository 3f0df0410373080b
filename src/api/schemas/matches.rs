use crate::domain::matching::MatchOverview;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MatchList {
    pub matches: Vec<MatchOverview>,
    pub count: usize,
}
