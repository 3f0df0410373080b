use crate::domain::events::ServerEvent;
use crate::services::presence::{Connection, PresenceService};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    outbound_dropped_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("flamr-server");
        Self {
            outbound_dropped_total: meter
                .u64_counter("flamr_websocket_outbound_dropped_total")
                .with_description("Events dropped because a connection's outbound queue was full")
                .build(),
        }
    }
}

/// Fan-out of server events to live connections, on top of a [`PresenceService`].
///
/// Delivery is best-effort: a full or closed outbound queue drops the event for that
/// connection only.
#[derive(Clone, Debug)]
pub struct RealtimeHub {
    presence: Arc<dyn PresenceService>,
    outbound_buffer_size: usize,
    metrics: Metrics,
}

impl RealtimeHub {
    #[must_use]
    pub fn new(presence: Arc<dyn PresenceService>, outbound_buffer_size: usize) -> Self {
        Self { presence, outbound_buffer_size, metrics: Metrics::new() }
    }

    /// Registers a new connection for `user_id` and announces the user if they just came online.
    pub async fn connect(&self, user_id: Uuid) -> (Connection, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.outbound_buffer_size);
        let connection = Connection::new(user_id, tx);

        if self.presence.register(connection.clone()).await {
            tracing::debug!(%user_id, "User came online");
            self.emit_all(&ServerEvent::UserOnline { user_id }).await;
        }
        (connection, rx)
    }

    /// Drops a connection and announces the user if it was their last one.
    pub async fn disconnect(&self, connection: &Connection) {
        let user_id = connection.user_id;
        if self.presence.unregister(user_id, connection.id).await {
            tracing::debug!(%user_id, "User went offline");
            self.emit_all(&ServerEvent::UserOffline { user_id }).await;
        }
    }

    pub async fn join_room(&self, match_id: Uuid, connection: &Connection) -> bool {
        self.presence.join_room(match_id, connection.id).await
    }

    pub async fn leave_room(&self, match_id: Uuid, connection: &Connection) {
        self.presence.leave_room(match_id, connection.id).await;
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.presence.is_online(user_id).await
    }

    /// Whether any connection of `user_id` is currently in the match room.
    pub async fn is_in_room(&self, match_id: Uuid, user_id: Uuid) -> bool {
        self.presence.room_members(match_id).await.iter().any(|c| c.user_id == user_id)
    }

    /// Whether the room holds a connection belonging to someone other than `user_id`.
    pub async fn room_has_other_member(&self, match_id: Uuid, user_id: Uuid) -> bool {
        self.presence.room_members(match_id).await.iter().any(|c| c.user_id != user_id)
    }

    pub async fn emit_to_room(&self, match_id: Uuid, event: &ServerEvent) {
        for connection in self.presence.room_members(match_id).await {
            self.deliver(&connection, event.clone());
        }
    }

    /// Room broadcast that skips one connection, used for typing indicators.
    pub async fn emit_to_room_except(&self, match_id: Uuid, except: Uuid, event: &ServerEvent) {
        for connection in self.presence.room_members(match_id).await {
            if connection.id != except {
                self.deliver(&connection, event.clone());
            }
        }
    }

    /// Sends to every connection of one user.
    pub async fn emit_to_user(&self, user_id: Uuid, event: &ServerEvent) {
        for connection in self.presence.connections_for(user_id).await {
            self.deliver(&connection, event.clone());
        }
    }

    pub async fn emit_all(&self, event: &ServerEvent) {
        for connection in self.presence.connections().await {
            self.deliver(&connection, event.clone());
        }
    }

    /// Sends to one connection only.
    pub fn send(&self, connection: &Connection, event: ServerEvent) {
        self.deliver(connection, event);
    }

    fn deliver(&self, connection: &Connection, event: ServerEvent) {
        match connection.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    user_id = %connection.user_id,
                    conn_id = %connection.id,
                    event = event.name(),
                    "Outbound queue full, dropping event"
                );
                self.metrics.outbound_dropped_total.add(1, &[KeyValue::new("event", event.name())]);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(conn_id = %connection.id, "Connection closed before delivery");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::presence::LocalPresence;

    fn hub(buffer: usize) -> RealtimeHub {
        RealtimeHub::new(Arc::new(LocalPresence::new()), buffer)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<&'static str> {
        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.name());
        }
        names
    }

    #[tokio::test]
    async fn test_online_announced_once_per_user() {
        let hub = hub(16);
        let watcher = Uuid::new_v4();
        let (_w, mut watcher_rx) = hub.connect(watcher).await;
        drain(&mut watcher_rx);

        let user = Uuid::new_v4();
        let (first, _rx1) = hub.connect(user).await;
        let (second, _rx2) = hub.connect(user).await;
        assert_eq!(drain(&mut watcher_rx), vec!["user_online"]);

        hub.disconnect(&first).await;
        assert!(drain(&mut watcher_rx).is_empty());
        assert!(hub.is_online(user).await);

        hub.disconnect(&second).await;
        assert_eq!(drain(&mut watcher_rx), vec!["user_offline"]);
        assert!(!hub.is_online(user).await);
    }

    #[tokio::test]
    async fn test_room_fanout_and_exclusion() {
        let hub = hub(16);
        let match_id = Uuid::new_v4();
        let (alice, mut alice_rx) = hub.connect(Uuid::new_v4()).await;
        let (bob, mut bob_rx) = hub.connect(Uuid::new_v4()).await;
        let (_carol, mut carol_rx) = hub.connect(Uuid::new_v4()).await;
        hub.join_room(match_id, &alice).await;
        hub.join_room(match_id, &bob).await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        drain(&mut carol_rx);

        let typing = ServerEvent::UserStoppedTyping { user_id: alice.user_id, match_id };
        hub.emit_to_room_except(match_id, alice.id, &typing).await;
        assert!(drain(&mut alice_rx).is_empty());
        assert_eq!(drain(&mut bob_rx), vec!["user_stopped_typing"]);

        let deleted = ServerEvent::MessageDeleted { match_id, message_id: Uuid::new_v4() };
        hub.emit_to_room(match_id, &deleted).await;
        assert_eq!(drain(&mut alice_rx), vec!["message_deleted"]);
        assert_eq!(drain(&mut bob_rx), vec!["message_deleted"]);
        assert!(drain(&mut carol_rx).is_empty());
    }

    #[tokio::test]
    async fn test_room_presence_queries() {
        let hub = hub(16);
        let match_id = Uuid::new_v4();
        let (alice, _a) = hub.connect(Uuid::new_v4()).await;
        let (bob, _b) = hub.connect(Uuid::new_v4()).await;

        hub.join_room(match_id, &alice).await;
        assert!(hub.is_in_room(match_id, alice.user_id).await);
        assert!(!hub.room_has_other_member(match_id, alice.user_id).await);

        hub.join_room(match_id, &bob).await;
        assert!(hub.room_has_other_member(match_id, alice.user_id).await);

        hub.leave_room(match_id, &bob).await;
        assert!(!hub.is_in_room(match_id, bob.user_id).await);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let hub = hub(1);
        let user = Uuid::new_v4();
        // The user's own online announcement fills the single slot.
        let (conn, mut rx) = hub.connect(user).await;

        hub.emit_to_user(user, &ServerEvent::UserOffline { user_id: Uuid::new_v4() }).await;
        hub.send(&conn, ServerEvent::JoinedMatch { match_id: Uuid::new_v4() });
        assert_eq!(drain(&mut rx), vec!["user_online"]);
    }
}
