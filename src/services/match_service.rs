use crate::adapters::database::DbPool;
use crate::adapters::database::match_repo::MatchRepository;
use crate::adapters::database::swipe_repo::SwipeRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::domain::matching::{Match, MatchCheck, MatchDetails, MatchOverview};
use crate::domain::swipe::{Swipe, SwipeOutcome};
use crate::error::{AppError, Result};
use opentelemetry::{global, metrics::Counter};
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    created_total: Counter<u64>,
    deactivated_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("flamr-server");
        Self {
            created_total: meter
                .u64_counter("flamr_matches_created_total")
                .with_description("Total matches formed from reciprocal likes")
                .build(),
            deactivated_total: meter
                .u64_counter("flamr_matches_deactivated_total")
                .with_description("Total matches deactivated by unmatch or block")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MatchService {
    pool: DbPool,
    repo: MatchRepository,
    swipe_repo: SwipeRepository,
    user_repo: UserRepository,
    metrics: Metrics,
}

impl MatchService {
    #[must_use]
    pub fn new(pool: DbPool, repo: MatchRepository, swipe_repo: SwipeRepository, user_repo: UserRepository) -> Self {
        Self { pool, repo, swipe_repo, user_repo, metrics: Metrics::new() }
    }

    /// Turns a freshly recorded like into a match when the other user already liked back.
    ///
    /// Concurrent reciprocal likes converge on one active match: the insert is guarded by the
    /// active-pair unique index and the loser re-reads the winner's row.
    ///
    /// # Errors
    /// Returns `AppError::Database` if any lookup or insert fails.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, conn, swipe),
        fields(swiper_id = %swipe.swiper_id, swiped_id = %swipe.swiped_id, match_id = tracing::field::Empty)
    )]
    pub(crate) async fn evaluate_for_match(&self, conn: &mut PgConnection, swipe: &Swipe) -> Result<SwipeOutcome> {
        if !swipe.is_like() {
            return Ok(SwipeOutcome::no_match());
        }
        if self.swipe_repo.find_reciprocal_like(conn, swipe).await?.is_none() {
            return Ok(SwipeOutcome::no_match());
        }

        let (record, created) = match self.repo.find_active_between(conn, swipe.swiper_id, swipe.swiped_id).await? {
            Some(existing) => (existing, false),
            None => match self.repo.create_active(conn, swipe.swiper_id, swipe.swiped_id).await? {
                Some(new_match) => (new_match, true),
                None => {
                    tracing::debug!("Lost match creation race, loading the winner");
                    let winner = self.repo.find_active_between(conn, swipe.swiper_id, swipe.swiped_id).await?;
                    (winner.ok_or(AppError::Internal)?, false)
                }
            },
        };

        tracing::Span::current().record("match_id", tracing::field::display(record.id));
        if created {
            self.metrics.created_total.add(1, &[]);
            tracing::info!("Match created");
        }

        let users = self.user_repo.find_summaries(conn, &record.user_ids).await?;
        Ok(SwipeOutcome::matched(MatchDetails { record, users }, created))
    }

    /// Active matches of `user_id`, most recently active first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<MatchOverview>> {
        let mut conn = self.pool.acquire().await?;
        let conversations = self.repo.list_conversations(&mut conn, user_id).await?;
        Ok(conversations.into_iter().map(Into::into).collect())
    }

    /// # Errors
    /// Returns `AppError::NotFound` if the match does not exist.
    /// Returns `AppError::Forbidden` if `user_id` is not a member.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn get(&self, match_id: Uuid, user_id: Uuid) -> Result<MatchOverview> {
        let mut conn = self.pool.acquire().await?;
        self.find_membership(&mut conn, match_id, user_id).await?;

        let conversation =
            self.repo.find_conversation(&mut conn, match_id, user_id).await?.ok_or_else(match_not_found)?;
        Ok(conversation.into())
    }

    /// Soft-deactivates a match. Messages are kept.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the match does not exist.
    /// Returns `AppError::Forbidden` if `user_id` is not a member.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn unmatch(&self, match_id: Uuid, user_id: Uuid) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        self.find_membership(&mut conn, match_id, user_id).await?;

        if self.repo.deactivate(&mut conn, match_id).await? {
            self.metrics.deactivated_total.add(1, &[]);
            tracing::info!("Match deactivated");
        }
        Ok(())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn check(&self, user_id: Uuid, other_id: Uuid) -> Result<MatchCheck> {
        let mut conn = self.pool.acquire().await?;
        let found = self.repo.find_active_between(&mut conn, user_id, other_id).await?;
        Ok(MatchCheck { is_matched: found.is_some(), match_id: found.map(|m| m.id) })
    }

    /// Deactivates any active match between the pair. Used when one blocks the other.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    pub(crate) async fn deactivate_between(&self, conn: &mut PgConnection, first: Uuid, second: Uuid) -> Result<()> {
        let deactivated = self.repo.deactivate_between(conn, first, second).await?;
        for match_id in &deactivated {
            self.metrics.deactivated_total.add(1, &[]);
            tracing::info!(%match_id, "Match deactivated by block");
        }
        Ok(())
    }

    /// Loads a match that `user_id` may chat in.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the match does not exist.
    /// Returns `AppError::Forbidden` if it is inactive or `user_id` is not a member.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn active_membership(&self, match_id: Uuid, user_id: Uuid) -> Result<Match> {
        let mut conn = self.pool.acquire().await?;
        let record = self.repo.find_by_id(&mut conn, match_id).await?.ok_or_else(match_not_found)?;
        record.ensure_active_member(user_id)?;
        Ok(record)
    }

    async fn find_membership(&self, conn: &mut PgConnection, match_id: Uuid, user_id: Uuid) -> Result<Match> {
        let record = self.repo.find_by_id(conn, match_id).await?.ok_or_else(match_not_found)?;
        record.ensure_member(user_id)?;
        Ok(record)
    }
}

pub(crate) fn match_not_found() -> AppError {
    AppError::NotFound("Match not found".into())
}
