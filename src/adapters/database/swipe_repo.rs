use crate::adapters::database::records::{IncomingLikeRecord, SwipeHistoryRecord, SwipeRecord};
use crate::adapters::database::{FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};
use crate::domain::pagination::PageRequest;
use crate::domain::swipe::{IncomingLike, Swipe, SwipeAction, SwipeHistoryEntry};
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

/// Append-only ledger of swipe decisions. There is no update or delete path.
#[derive(Clone, Debug, Default)]
pub struct SwipeRepository {}

impl SwipeRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Records a swipe. The `(swiper_id, swiped_id)` unique constraint rejects repeats.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if this pair already has a swipe.
    /// Returns `AppError::NotFound` if either user does not exist.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        swiper_id: Uuid,
        swiped_id: Uuid,
        action: SwipeAction,
    ) -> Result<Swipe> {
        let result = sqlx::query_as::<_, SwipeRecord>(
            r#"
            INSERT INTO swipes (swiper_id, swiped_id, action)
            VALUES ($1, $2, $3)
            RETURNING id, swiper_id, swiped_id, action, created_at
            "#,
        )
        .bind(swiper_id)
        .bind(swiped_id)
        .bind(action.as_str())
        .fetch_one(conn)
        .await;

        match result {
            Ok(record) => record.try_into(),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::Conflict("You have already swiped on this user".into()))
            }
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                Err(AppError::NotFound("User not found".into()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Finds the like that `swipe.swiped_id` made on `swipe.swiper_id`, if any.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, swipe), fields(swipe_id = %swipe.id))]
    pub(crate) async fn find_reciprocal_like(&self, conn: &mut PgConnection, swipe: &Swipe) -> Result<Option<Swipe>> {
        let record = sqlx::query_as::<_, SwipeRecord>(
            r#"
            SELECT id, swiper_id, swiped_id, action, created_at
            FROM swipes
            WHERE swiper_id = $1 AND swiped_id = $2 AND action = 'like'
            "#,
        )
        .bind(swipe.swiped_id)
        .bind(swipe.swiper_id)
        .fetch_optional(conn)
        .await?;

        record.map(TryInto::try_into).transpose()
    }

    /// A page of the swiper's decisions, newest first, with the total count.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn history(
        &self,
        conn: &mut PgConnection,
        swiper_id: Uuid,
        action: Option<SwipeAction>,
        page: PageRequest,
    ) -> Result<(Vec<SwipeHistoryEntry>, i64)> {
        let action = action.map(SwipeAction::as_str);

        let records = sqlx::query_as::<_, SwipeHistoryRecord>(
            r#"
            SELECT s.id, s.action, s.created_at,
                   u.id AS user_id, u.name, u.age, u.bio, u.photo_url
            FROM swipes s
            JOIN users u ON u.id = s.swiped_id
            WHERE s.swiper_id = $1
              AND ($2::text IS NULL OR s.action = $2)
            ORDER BY s.created_at DESC, s.id DESC
            OFFSET $3
            LIMIT $4
            "#,
        )
        .bind(swiper_id)
        .bind(action)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM swipes WHERE swiper_id = $1 AND ($2::text IS NULL OR action = $2)",
        )
        .bind(swiper_id)
        .bind(action)
        .fetch_one(conn)
        .await?;

        let entries = records.into_iter().map(TryInto::try_into).collect::<Result<Vec<_>>>()?;
        Ok((entries, total))
    }

    /// Users who liked `user_id` and have not yet been swiped on by `user_id`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn incoming_likes(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<IncomingLike>> {
        let records = sqlx::query_as::<_, IncomingLikeRecord>(
            r#"
            SELECT s.id AS swipe_id, s.created_at,
                   u.id AS user_id, u.name, u.age, u.bio, u.photo_url
            FROM swipes s
            JOIN users u ON u.id = s.swiper_id
            WHERE s.swiped_id = $1
              AND s.action = 'like'
              AND u.is_active AND NOT u.is_banned
              AND NOT EXISTS (
                  SELECT 1 FROM swipes mine
                  WHERE mine.swiper_id = $1 AND mine.swiped_id = s.swiper_id
              )
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}
