use crate::adapters::database::records::{ConversationRecord, MatchRecord};
use crate::domain::conversation::Conversation;
use crate::domain::matching::Match;
use crate::error::Result;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct MatchRepository {}

impl MatchRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, match_id: Uuid) -> Result<Option<Match>> {
        let record = sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT id, user_a, user_b, last_message_id, last_message_at, is_active, created_at
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .fetch_optional(conn)
        .await?;

        record.map(TryInto::try_into).transpose()
    }

    /// Loads a match and holds its row lock until the surrounding transaction ends.
    /// Writers that touch a match's messages or `last_message_id` go through this first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_by_id_for_update(&self, conn: &mut PgConnection, match_id: Uuid) -> Result<Option<Match>> {
        let record = sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT id, user_a, user_b, last_message_id, last_message_at, is_active, created_at
            FROM matches
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(match_id)
        .fetch_optional(conn)
        .await?;

        record.map(TryInto::try_into).transpose()
    }

    /// The active match over the unordered pair, if one exists.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_active_between(
        &self,
        conn: &mut PgConnection,
        first: Uuid,
        second: Uuid,
    ) -> Result<Option<Match>> {
        let record = sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT id, user_a, user_b, last_message_id, last_message_at, is_active, created_at
            FROM matches
            WHERE is_active
              AND LEAST(user_a, user_b) = LEAST($1::uuid, $2::uuid)
              AND GREATEST(user_a, user_b) = GREATEST($1::uuid, $2::uuid)
            "#,
        )
        .bind(first)
        .bind(second)
        .fetch_optional(conn)
        .await?;

        record.map(TryInto::try_into).transpose()
    }

    /// Inserts an active match unless the pair already has one.
    ///
    /// Returns `None` when another writer won the race; the caller re-reads the winner.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn create_active(
        &self,
        conn: &mut PgConnection,
        first: Uuid,
        second: Uuid,
    ) -> Result<Option<Match>> {
        let record = sqlx::query_as::<_, MatchRecord>(
            r#"
            INSERT INTO matches (user_a, user_b)
            VALUES ($1, $2)
            ON CONFLICT ((LEAST(user_a, user_b)), (GREATEST(user_a, user_b))) WHERE is_active
            DO NOTHING
            RETURNING id, user_a, user_b, last_message_id, last_message_at, is_active, created_at
            "#,
        )
        .bind(first)
        .bind(second)
        .fetch_optional(conn)
        .await?;

        record.map(TryInto::try_into).transpose()
    }

    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn deactivate(&self, conn: &mut PgConnection, match_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE matches SET is_active = FALSE WHERE id = $1 AND is_active")
            .bind(match_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivates whatever match is active between the pair. Returns the ids that changed.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn deactivate_between(
        &self,
        conn: &mut PgConnection,
        first: Uuid,
        second: Uuid,
    ) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE matches SET is_active = FALSE
            WHERE is_active
              AND LEAST(user_a, user_b) = LEAST($1::uuid, $2::uuid)
              AND GREATEST(user_a, user_b) = GREATEST($1::uuid, $2::uuid)
            RETURNING id
            "#,
        )
        .bind(first)
        .bind(second)
        .fetch_all(conn)
        .await?;

        Ok(ids)
    }

    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn set_last_message(
        &self,
        conn: &mut PgConnection,
        match_id: Uuid,
        message_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<()> {
        sqlx::query("UPDATE matches SET last_message_id = $2, last_message_at = $3 WHERE id = $1")
            .bind(match_id)
            .bind(message_id)
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Points the match at its newest remaining message, or clears both fields when none remain.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn refresh_last_message(&self, conn: &mut PgConnection, match_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE matches SET (last_message_id, last_message_at) = (
                SELECT id, created_at FROM messages
                WHERE match_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Active matches of `user_id` with the other member, the latest message and the unread
    /// count, most recently active first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list_conversations(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<Conversation>> {
        let records = sqlx::query_as::<_, ConversationRecord>(
            r#"
            SELECT m.id AS match_id, m.created_at AS matched_at, m.last_message_at,
                   u.id AS other_id, u.name AS other_name, u.age AS other_age,
                   u.bio AS other_bio, u.photo_url AS other_photo_url,
                   lm.id AS last_id, lm.content AS last_content, lm.sender_id AS last_sender_id,
                   lm.status AS last_status, lm.created_at AS last_created_at,
                   (SELECT COUNT(*) FROM messages um
                    WHERE um.match_id = m.id AND um.sender_id <> $1 AND um.status <> 'seen') AS unread_count
            FROM matches m
            JOIN users u ON u.id = CASE WHEN m.user_a = $1 THEN m.user_b ELSE m.user_a END
            LEFT JOIN messages lm ON lm.id = m.last_message_id
            WHERE m.is_active AND (m.user_a = $1 OR m.user_b = $1)
            ORDER BY m.last_message_at DESC NULLS LAST, m.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        records.into_iter().map(TryInto::try_into).collect()
    }

    /// A single match projected for `viewer_id`, whether or not it is still active.
    /// Returns `None` if the match does not exist or `viewer_id` is not a member.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_conversation(
        &self,
        conn: &mut PgConnection,
        match_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Option<Conversation>> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            r#"
            SELECT m.id AS match_id, m.created_at AS matched_at, m.last_message_at,
                   u.id AS other_id, u.name AS other_name, u.age AS other_age,
                   u.bio AS other_bio, u.photo_url AS other_photo_url,
                   lm.id AS last_id, lm.content AS last_content, lm.sender_id AS last_sender_id,
                   lm.status AS last_status, lm.created_at AS last_created_at,
                   (SELECT COUNT(*) FROM messages um
                    WHERE um.match_id = m.id AND um.sender_id <> $2 AND um.status <> 'seen') AS unread_count
            FROM matches m
            JOIN users u ON u.id = CASE WHEN m.user_a = $2 THEN m.user_b ELSE m.user_a END
            LEFT JOIN messages lm ON lm.id = m.last_message_id
            WHERE m.id = $1 AND (m.user_a = $2 OR m.user_b = $2)
            "#,
        )
        .bind(match_id)
        .bind(viewer_id)
        .fetch_optional(conn)
        .await?;

        record.map(TryInto::try_into).transpose()
    }
}
