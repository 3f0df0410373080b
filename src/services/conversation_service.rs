use crate::adapters::database::DbPool;
use crate::adapters::database::match_repo::MatchRepository;
use crate::domain::conversation::Conversation;
use crate::error::Result;
use uuid::Uuid;

/// Read-side chat list: active matches with their latest message and unread counts.
#[derive(Clone, Debug)]
pub struct ConversationService {
    pool: DbPool,
    match_repo: MatchRepository,
}

impl ConversationService {
    #[must_use]
    pub const fn new(pool: DbPool, match_repo: MatchRepository) -> Self {
        Self { pool, match_repo }
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let mut conn = self.pool.acquire().await?;
        self.match_repo.list_conversations(&mut conn, user_id).await
    }
}
