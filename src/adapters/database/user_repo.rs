use crate::adapters::database::FOREIGN_KEY_VIOLATION;
use crate::adapters::database::records::{UserAccountRecord, UserSummaryRecord};
use crate::domain::user::{Identity, UserStatus, UserSummary};
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

/// Read access to the user directory plus the block list, which the core owns.
#[derive(Clone, Debug, Default)]
pub struct UserRepository {}

impl UserRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Loads the identity and account flags for a user.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_account(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Option<(Identity, UserStatus)>> {
        let record = sqlx::query_as::<_, UserAccountRecord>(
            r#"
            SELECT id, name, photo_url, is_verified, is_active, is_banned
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_status(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Option<UserStatus>> {
        Ok(self.find_account(conn, user_id).await?.map(|(_, status)| status))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_summary(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Option<UserSummary>> {
        let record = sqlx::query_as::<_, UserSummaryRecord>(
            "SELECT id, name, age, bio, photo_url FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Fetches summaries in the order of `user_ids`; unknown ids are skipped.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_summaries(&self, conn: &mut PgConnection, user_ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        let records = sqlx::query_as::<_, UserSummaryRecord>(
            r#"
            SELECT u.id, u.name, u.age, u.bio, u.photo_url
            FROM UNNEST($1::uuid[]) WITH ORDINALITY AS wanted(id, ord)
            JOIN users u ON u.id = wanted.id
            ORDER BY wanted.ord
            "#,
        )
        .bind(user_ids)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Whether `blocker_id` has `blocked_id` in their block list. One-directional.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn is_blocked(&self, conn: &mut PgConnection, blocker_id: Uuid, blocked_id: Uuid) -> Result<bool> {
        let blocked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_blocks WHERE blocker_id = $1 AND blocked_id = $2)",
        )
        .bind(blocker_id)
        .bind(blocked_id)
        .fetch_one(conn)
        .await?;

        Ok(blocked)
    }

    /// Adds `blocked_id` to the block list. Blocking twice is a no-op.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if either user does not exist.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn block(&self, conn: &mut PgConnection, blocker_id: Uuid, blocked_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_blocks (blocker_id, blocked_id)
            VALUES ($1, $2)
            ON CONFLICT (blocker_id, blocked_id) DO NOTHING
            "#,
        )
        .bind(blocker_id)
        .bind(blocked_id)
        .execute(conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                Err(AppError::NotFound("User not found".into()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// # Errors
    /// Returns `AppError::Database` if the delete fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn unblock(&self, conn: &mut PgConnection, blocker_id: Uuid, blocked_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_blocks WHERE blocker_id = $1 AND blocked_id = $2")
            .bind(blocker_id)
            .bind(blocked_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list_blocked(&self, conn: &mut PgConnection, blocker_id: Uuid) -> Result<Vec<UserSummary>> {
        let records = sqlx::query_as::<_, UserSummaryRecord>(
            r#"
            SELECT u.id, u.name, u.age, u.bio, u.photo_url
            FROM user_blocks b
            JOIN users u ON u.id = b.blocked_id
            WHERE b.blocker_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(blocker_id)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn touch_last_active(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_active = NOW() WHERE id = $1").bind(user_id).execute(conn).await?;
        Ok(())
    }
}
