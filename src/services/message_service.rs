use crate::adapters::database::DbPool;
use crate::adapters::database::match_repo::MatchRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::config::ChatConfig;
use crate::domain::events::{NotificationSender, ServerEvent};
use crate::domain::matching::Match;
use crate::domain::message::{MessageContent, MessagePage, MessageStatus, MessageView};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::error::{AppError, Result};
use crate::services::hub::RealtimeHub;
use crate::services::match_service::match_not_found;
use opentelemetry::{KeyValue, global, metrics::Counter};
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    sent_total: Counter<u64>,
    deleted_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("flamr-server");
        Self {
            sent_total: meter
                .u64_counter("flamr_messages_sent_total")
                .with_description("Total messages stored, by status at the end of the send")
                .build(),
            deleted_total: meter
                .u64_counter("flamr_messages_deleted_total")
                .with_description("Total messages deleted by their sender")
                .build(),
        }
    }
}

/// The message store and its delivery lifecycle. REST handlers and gateway sessions both call
/// into this service, so validation and broadcasts are identical on either path.
#[derive(Clone, Debug)]
pub struct MessageService {
    pool: DbPool,
    repo: MessageRepository,
    match_repo: MatchRepository,
    user_repo: UserRepository,
    hub: RealtimeHub,
    config: ChatConfig,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        repo: MessageRepository,
        match_repo: MatchRepository,
        user_repo: UserRepository,
        hub: RealtimeHub,
        config: ChatConfig,
    ) -> Self {
        Self { pool, repo, match_repo, user_repo, hub, config, metrics: Metrics::new() }
    }

    /// Stores a message and pushes it to the match room.
    ///
    /// If the recipient is connected but not viewing this match they get a short
    /// notification instead; if they are viewing it the message is marked delivered at once.
    /// The returned view carries the final status.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if the content is blank or too long.
    /// Returns `AppError::NotFound` if the match does not exist.
    /// Returns `AppError::Forbidden` if the match is inactive or the sender is not a member.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, raw_content),
        fields(message_id = tracing::field::Empty)
    )]
    pub async fn send_message(&self, match_id: Uuid, sender_id: Uuid, raw_content: &str) -> Result<MessageView> {
        let content = MessageContent::parse(raw_content, self.config.max_message_chars)?;

        let (record, mut view) = {
            let mut tx = self.pool.begin().await?;
            let record = self.lock_active_match(&mut tx, match_id, sender_id).await?;

            let message = self.repo.create(&mut tx, match_id, sender_id, &content).await?;
            self.match_repo.set_last_message(&mut tx, match_id, message.id, message.created_at).await?;
            let sender = self.user_repo.find_summary(&mut tx, sender_id).await?.ok_or(AppError::Internal)?;

            tx.commit().await?;
            (record, MessageView { message, sender })
        };

        let message_id = view.message.id;
        tracing::Span::current().record("message_id", tracing::field::display(message_id));

        self.hub.emit_to_room(match_id, &ServerEvent::NewMessage(view.clone())).await;

        if let Some(recipient_id) = record.other_member(sender_id) {
            self.notify_if_elsewhere(match_id, recipient_id, &view, &content).await;
        }

        // The message is committed from here on; a failed delivery mark leaves it `sent`.
        if self.hub.room_has_other_member(match_id, sender_id).await {
            match self.mark_delivered_now(message_id).await {
                Ok(true) => {
                    view.message.status = MessageStatus::Delivered;
                    self.hub.emit_to_room(match_id, &ServerEvent::MessageDelivered { message_id, match_id }).await;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(error = %e, "Failed to mark message delivered for present recipient"),
            }
        }

        self.metrics.sent_total.add(1, &[KeyValue::new("status", view.message.status.as_str())]);
        tracing::debug!(status = view.message.status.as_str(), "Message sent");
        Ok(view)
    }

    /// A page of messages, oldest first within the page. Has no side effects.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for an invalid page request.
    /// Returns `AppError::NotFound` or `AppError::Forbidden` when the caller may not read the match.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_messages(
        &self,
        match_id: Uuid,
        requester_id: Uuid,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<MessagePage> {
        let request = PageRequest::new(page, limit, self.config.default_page_size, self.config.max_page_size)?;

        let mut conn = self.pool.acquire().await?;
        self.find_active_match(&mut conn, match_id, requester_id).await?;

        let mut messages = self.repo.page(&mut conn, match_id, request).await?;
        messages.reverse();
        let total = self.repo.count(&mut conn, match_id).await?;

        Ok(MessagePage { messages, pagination: Pagination::new(request, total) })
    }

    /// Treats a read of the conversation as proof the reader is present: every `sent`
    /// message from the other member becomes `delivered`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn record_implied_delivery(&self, match_id: Uuid, reader_id: Uuid) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        let updated = self.repo.mark_delivered_for_reader(&mut conn, match_id, reader_id).await?;
        if updated > 0 {
            tracing::debug!(updated, "Marked messages delivered on read");
        }
        Ok(updated)
    }

    /// Marks everything the other member sent as seen and tells the room.
    ///
    /// Repeating the call changes nothing in the store but still broadcasts.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` or `AppError::Forbidden` when the caller may not use the match.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn mark_seen(&self, match_id: Uuid, reader_id: Uuid) -> Result<OffsetDateTime> {
        let mut conn = self.pool.acquire().await?;
        self.find_active_match(&mut conn, match_id, reader_id).await?;

        let seen_at = OffsetDateTime::now_utc();
        let updated = self.repo.mark_seen(&mut conn, match_id, reader_id, seen_at).await?;
        tracing::debug!(updated, "Marked messages seen");

        self.hub.emit_to_room(match_id, &ServerEvent::MessagesSeen { match_id, seen_by: reader_id, seen_at }).await;
        Ok(seen_at)
    }

    /// Hard-deletes one of the requester's own messages and repairs the match's last-message
    /// pointer if it pointed at it.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the match or message does not exist.
    /// Returns `AppError::Forbidden` if the requester did not send the message or may not use the match.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn delete_message(&self, match_id: Uuid, message_id: Uuid, requester_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let record = self.lock_active_match(&mut tx, match_id, requester_id).await?;

        let message = self
            .repo
            .find_in_match(&mut tx, match_id, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".into()))?;
        if message.sender_id != requester_id {
            return Err(AppError::Forbidden("You can only delete your own messages".into()));
        }

        self.repo.delete(&mut tx, message_id).await?;
        if record.last_message_id == Some(message_id) {
            self.match_repo.refresh_last_message(&mut tx, match_id).await?;
        }
        tx.commit().await?;

        self.metrics.deleted_total.add(1, &[]);
        tracing::info!("Message deleted");

        self.hub.emit_to_room(match_id, &ServerEvent::MessageDeleted { match_id, message_id }).await;
        Ok(())
    }

    async fn notify_if_elsewhere(
        &self,
        match_id: Uuid,
        recipient_id: Uuid,
        view: &MessageView,
        content: &MessageContent,
    ) {
        if !self.hub.is_online(recipient_id).await || self.hub.is_in_room(match_id, recipient_id).await {
            return;
        }

        let event = ServerEvent::NewMessageNotification {
            match_id,
            sender: NotificationSender {
                id: view.sender.id,
                name: view.sender.name.clone(),
                photo: view.sender.photo.clone(),
            },
            preview: content.preview(self.config.notification_preview_chars),
        };
        self.hub.emit_to_user(recipient_id, &event).await;
    }

    async fn mark_delivered_now(&self, message_id: Uuid) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        self.repo.mark_delivered(&mut conn, message_id).await
    }

    async fn find_active_match(&self, conn: &mut PgConnection, match_id: Uuid, user_id: Uuid) -> Result<Match> {
        let record = self.match_repo.find_by_id(conn, match_id).await?.ok_or_else(match_not_found)?;
        record.ensure_active_member(user_id)?;
        Ok(record)
    }

    async fn lock_active_match(&self, conn: &mut PgConnection, match_id: Uuid, user_id: Uuid) -> Result<Match> {
        let record = self.match_repo.find_by_id_for_update(conn, match_id).await?.ok_or_else(match_not_found)?;
        record.ensure_active_member(user_id)?;
        Ok(record)
    }
}
