use crate::adapters::database::DbPool;
use crate::adapters::database::swipe_repo::SwipeRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::config::SwipeConfig;
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::swipe::{IncomingLike, SwipeAction, SwipeHistoryEntry, SwipeOutcome};
use crate::error::{AppError, Result};
use crate::services::match_service::MatchService;
use opentelemetry::{KeyValue, global, metrics::Counter};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    swipes_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("flamr-server");
        Self {
            swipes_total: meter
                .u64_counter("flamr_swipes_total")
                .with_description("Total swipes recorded")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SwipeService {
    pool: DbPool,
    repo: SwipeRepository,
    user_repo: UserRepository,
    match_service: MatchService,
    config: SwipeConfig,
    metrics: Metrics,
}

impl SwipeService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        repo: SwipeRepository,
        user_repo: UserRepository,
        match_service: MatchService,
        config: SwipeConfig,
    ) -> Self {
        Self { pool, repo, user_repo, match_service, config, metrics: Metrics::new() }
    }

    /// Records a like or pass and, for likes, checks whether it completes a match.
    ///
    /// The swipe is committed before the reciprocity check runs, so of two concurrent
    /// reciprocal likes at least one always observes the other.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` when swiping on oneself.
    /// Returns `AppError::NotFound` if the target is missing, inactive or banned.
    /// Returns `AppError::Forbidden` if the swiper has blocked the target.
    /// Returns `AppError::Conflict` if the swiper already swiped on the target.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(action = action.as_str()))]
    pub async fn record_swipe(&self, swiper_id: Uuid, target_id: Uuid, action: SwipeAction) -> Result<SwipeOutcome> {
        if swiper_id == target_id {
            return Err(AppError::BadRequest("You cannot swipe on yourself".into()));
        }

        let mut conn = self.pool.acquire().await?;

        let reachable = self.user_repo.find_status(&mut conn, target_id).await?.is_some_and(|s| s.is_reachable());
        if !reachable {
            return Err(AppError::NotFound("User not found".into()));
        }
        if self.user_repo.is_blocked(&mut conn, swiper_id, target_id).await? {
            return Err(AppError::Forbidden("You have blocked this user".into()));
        }

        let swipe = self.repo.create(&mut conn, swiper_id, target_id, action).await?;
        self.metrics.swipes_total.add(1, &[KeyValue::new("action", action.as_str())]);
        tracing::debug!(swipe_id = %swipe.id, "Swipe recorded");

        self.match_service.evaluate_for_match(&mut conn, &swipe).await
    }

    /// # Errors
    /// Returns `AppError::BadRequest` for an invalid page request.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn history(
        &self,
        swiper_id: Uuid,
        action: Option<SwipeAction>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<(Vec<SwipeHistoryEntry>, Pagination)> {
        let request = PageRequest::new(page, limit, self.config.default_page_size, self.config.max_page_size)?;

        let mut conn = self.pool.acquire().await?;
        let (entries, total) = self.repo.history(&mut conn, swiper_id, action, request).await?;
        Ok((entries, Pagination::new(request, total)))
    }

    /// Likes the caller has received and not yet answered.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn likes_me(&self, user_id: Uuid) -> Result<Vec<IncomingLike>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.incoming_likes(&mut conn, user_id).await
    }
}
