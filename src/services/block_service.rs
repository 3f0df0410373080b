use crate::adapters::database::DbPool;
use crate::adapters::database::user_repo::UserRepository;
use crate::domain::user::UserSummary;
use crate::error::{AppError, Result};
use crate::services::match_service::MatchService;
use uuid::Uuid;

/// One-directional block list. Blocking also ends any active match between the pair;
/// unblocking does not bring it back.
#[derive(Clone, Debug)]
pub struct BlockService {
    pool: DbPool,
    user_repo: UserRepository,
    match_service: MatchService,
}

impl BlockService {
    #[must_use]
    pub const fn new(pool: DbPool, user_repo: UserRepository, match_service: MatchService) -> Self {
        Self { pool, user_repo, match_service }
    }

    /// # Errors
    /// Returns `AppError::BadRequest` when blocking oneself.
    /// Returns `AppError::NotFound` if the target does not exist.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn block(&self, blocker_id: Uuid, blocked_id: Uuid) -> Result<()> {
        if blocker_id == blocked_id {
            return Err(AppError::BadRequest("You cannot block yourself".into()));
        }

        let mut tx = self.pool.begin().await?;
        if self.user_repo.find_status(&mut tx, blocked_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }
        self.user_repo.block(&mut tx, blocker_id, blocked_id).await?;
        self.match_service.deactivate_between(&mut tx, blocker_id, blocked_id).await?;
        tx.commit().await?;

        tracing::info!("User blocked");
        Ok(())
    }

    /// # Errors
    /// Returns `AppError::Database` if the delete fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn unblock(&self, blocker_id: Uuid, blocked_id: Uuid) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        if self.user_repo.unblock(&mut conn, blocker_id, blocked_id).await? {
            tracing::info!("User unblocked");
        }
        Ok(())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_blocked(&self, blocker_id: Uuid) -> Result<Vec<UserSummary>> {
        let mut conn = self.pool.acquire().await?;
        self.user_repo.list_blocked(&mut conn, blocker_id).await
    }
}
