use crate::adapters::database::records::{MessageRecord, MessageViewRecord};
use crate::domain::message::{Message, MessageContent, MessageStatus, MessageView};
use crate::domain::pagination::PageRequest;
use crate::error::Result;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Stores a new message in `sent` status.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, content))]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        match_id: Uuid,
        sender_id: Uuid,
        content: &MessageContent,
    ) -> Result<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, match_id, sender_id, content, status)
            VALUES ($1, $2, $3, $4, 'sent')
            RETURNING id, match_id, sender_id, content, status, seen_at, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(match_id)
        .bind(sender_id)
        .bind(content.as_str())
        .fetch_one(conn)
        .await?;

        record.try_into()
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_in_match(
        &self,
        conn: &mut PgConnection,
        match_id: Uuid,
        message_id: Uuid,
    ) -> Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, match_id, sender_id, content, status, seen_at, created_at
            FROM messages
            WHERE id = $1 AND match_id = $2
            "#,
        )
        .bind(message_id)
        .bind(match_id)
        .fetch_optional(conn)
        .await?;

        record.map(TryInto::try_into).transpose()
    }

    /// One page of a match's messages with sender summaries, newest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn page(
        &self,
        conn: &mut PgConnection,
        match_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<MessageView>> {
        let records = sqlx::query_as::<_, MessageViewRecord>(
            r#"
            SELECT m.id, m.match_id, m.sender_id, m.content, m.status, m.seen_at, m.created_at,
                   u.name AS sender_name, u.age AS sender_age, u.bio AS sender_bio,
                   u.photo_url AS sender_photo_url
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.match_id = $1
            ORDER BY m.created_at DESC, m.id DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(match_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(conn)
        .await?;

        records.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn count(&self, conn: &mut PgConnection, match_id: Uuid) -> Result<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE match_id = $1").bind(match_id).fetch_one(conn).await?;
        Ok(total)
    }

    /// Moves a single message from `sent` to `delivered`. Returns whether it changed.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn mark_delivered(&self, conn: &mut PgConnection, message_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE messages SET status = 'delivered' WHERE id = $1 AND status = ANY($2)")
            .bind(message_id)
            .bind(MessageStatus::sources_for(MessageStatus::Delivered))
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves every `sent` message in the match that `reader_id` did not write to `delivered`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn mark_delivered_for_reader(
        &self,
        conn: &mut PgConnection,
        match_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET status = 'delivered'
            WHERE match_id = $1 AND sender_id <> $2 AND status = ANY($3)
            "#,
        )
        .bind(match_id)
        .bind(reader_id)
        .bind(MessageStatus::sources_for(MessageStatus::Delivered))
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Marks every unseen message in the match that `reader_id` did not write as seen at `at`.
    /// Rows already seen keep their original `seen_at`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn mark_seen(
        &self,
        conn: &mut PgConnection,
        match_id: Uuid,
        reader_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET status = 'seen', seen_at = $3
            WHERE match_id = $1 AND sender_id <> $2 AND status = ANY($4)
            "#,
        )
        .bind(match_id)
        .bind(reader_id)
        .bind(at)
        .bind(MessageStatus::sources_for(MessageStatus::Seen))
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// # Errors
    /// Returns `AppError::Database` if the delete fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn delete(&self, conn: &mut PgConnection, message_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1").bind(message_id).execute(conn).await?;
        Ok(result.rows_affected() > 0)
    }
}
