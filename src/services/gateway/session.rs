use crate::config::WsConfig;
use crate::domain::events::{ClientEvent, ServerEvent};
use crate::domain::user::Identity;
use crate::error::{AppError, Result};
use crate::services::gateway::Metrics;
use crate::services::hub::RealtimeHub;
use crate::services::identity_service::IdentityService;
use crate::services::match_service::MatchService;
use crate::services::message_service::MessageService;
use crate::services::presence::Connection;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{SinkExt, StreamExt};
use opentelemetry::KeyValue;
use std::time::Duration;
use tokio::time::{Instant, interval_at, sleep};
use uuid::Uuid;

#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) identity: Identity,
    pub(crate) request_id: String,
    pub(crate) socket: WebSocket,
    pub(crate) identity_service: IdentityService,
    pub(crate) match_service: MatchService,
    pub(crate) message_service: MessageService,
    pub(crate) hub: RealtimeHub,
    pub(crate) metrics: Metrics,
    pub(crate) config: WsConfig,
    pub(crate) shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl Session {
    #[tracing::instrument(
        name = "websocket_session",
        skip(self),
        fields(
            user_id = %self.identity.user_id,
            request_id = %self.request_id,
            otel.kind = "server",
            ws.session_id = %Uuid::new_v4()
        )
    )]
    pub(crate) async fn run(self) {
        let Self { identity, socket, identity_service, match_service, message_service, hub, metrics, config, mut shutdown_rx, .. } =
            self;
        let user_id = identity.user_id;

        metrics.active_connections.add(1, &[]);
        tracing::info!("WebSocket connected");

        let (connection, mut outbound_rx) = hub.connect(user_id).await;
        identity_service.touch_last_active(user_id);

        let (mut ws_sink, mut ws_stream) = socket.split();

        let handler = EventHandler { identity: &identity, connection: &connection, match_service, message_service, hub: &hub };

        let ping_period = Duration::from_secs(config.ping_interval_secs.max(1));
        let mut ping = interval_at(Instant::now() + ping_period, ping_period);
        let idle_timeout = Duration::from_secs(config.idle_timeout_secs);
        let idle = sleep(idle_timeout);
        tokio::pin!(idle);

        loop {
            if *shutdown_rx.borrow() {
                tracing::info!("Shutdown signal received, closing WebSocket");
                let _ = ws_sink
                    .send(WsMessage::Close(Some(axum::extract::ws::CloseFrame {
                        code: axum::extract::ws::close_code::AWAY,
                        reason: "Server shutting down".into(),
                    })))
                    .await;
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() { break; }
                }

                msg = ws_stream.next() => {
                    if let Some(Ok(_)) = &msg {
                        idle.as_mut().reset(Instant::now() + idle_timeout);
                    }

                    let continue_loop = match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            match serde_json::from_str::<ClientEvent>(text.as_str()) {
                                Ok(event) => {
                                    metrics.events_total.add(1, &[KeyValue::new("event", event.name())]);
                                    handler.handle(event).await;
                                }
                                Err(e) => {
                                    tracing::debug!(error = %e, "Rejected malformed client event");
                                    metrics.events_total.add(1, &[KeyValue::new("event", "invalid")]);
                                    handler.reject("Invalid event payload");
                                }
                            }
                            true
                        }
                        Some(Ok(WsMessage::Binary(_))) => {
                            tracing::debug!("Received unexpected binary frame");
                            handler.reject("Binary frames are not supported");
                            true
                        }
                        Some(Ok(WsMessage::Ping(_))) => {
                            tracing::trace!("Received heartbeat ping from client");
                            true
                        }
                        Some(Ok(WsMessage::Pong(_))) => {
                            tracing::trace!("Received heartbeat pong from client");
                            true
                        }
                        Some(Ok(WsMessage::Close(_)) | Err(_)) | None => false,
                    };

                    if !continue_loop { break; }
                }

                event = outbound_rx.recv() => {
                    let Some(event) = event else { break };
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            if ws_sink.send(WsMessage::Text(json.into())).await.is_err() { break; }
                        }
                        Err(e) => tracing::error!(error = %e, event = event.name(), "Failed to encode server event"),
                    }
                }

                _ = ping.tick() => {
                    if ws_sink.send(WsMessage::Ping(axum::body::Bytes::new())).await.is_err() { break; }
                }

                () = &mut idle => {
                    tracing::info!("WebSocket idle timeout");
                    break;
                }
            }
        }

        let _ = ws_sink.close().await;

        hub.disconnect(&connection).await;
        identity_service.touch_last_active(user_id);

        metrics.active_connections.add(-1, &[]);
        tracing::info!("WebSocket disconnected");
    }
}

/// Applies client events on behalf of one connection. Failures become an `error` event for
/// this connection only; the session keeps running.
#[derive(Debug)]
struct EventHandler<'a> {
    identity: &'a Identity,
    connection: &'a Connection,
    match_service: MatchService,
    message_service: MessageService,
    hub: &'a RealtimeHub,
}

impl EventHandler<'_> {
    async fn handle(&self, event: ClientEvent) {
        let name = event.name();
        if let Err(e) = self.dispatch(event).await {
            tracing::debug!(event = name, error = %e, "Client event failed");
            if matches!(e, AppError::Database(_) | AppError::Internal) {
                e.log();
            }
            self.hub.send(self.connection, ServerEvent::error(&e));
        }
    }

    fn reject(&self, message: &str) {
        self.hub.send(self.connection, ServerEvent::Error { message: message.to_string() });
    }

    async fn dispatch(&self, event: ClientEvent) -> Result<()> {
        let user_id = self.identity.user_id;

        match event {
            ClientEvent::JoinMatch { match_id } => {
                self.match_service.active_membership(match_id, user_id).await?;
                self.hub.join_room(match_id, self.connection).await;
                self.message_service.record_implied_delivery(match_id, user_id).await?;
                self.hub.send(self.connection, ServerEvent::JoinedMatch { match_id });
            }
            ClientEvent::LeaveMatch { match_id } => {
                self.hub.leave_room(match_id, self.connection).await;
            }
            ClientEvent::SendMessage { match_id, content } => {
                self.message_service.send_message(match_id, user_id, &content).await?;
            }
            ClientEvent::TypingStart { match_id } => {
                let event = ServerEvent::UserTyping { user_id, match_id, name: self.identity.name.clone() };
                self.hub.emit_to_room_except(match_id, self.connection.id, &event).await;
            }
            ClientEvent::TypingStop { match_id } => {
                let event = ServerEvent::UserStoppedTyping { user_id, match_id };
                self.hub.emit_to_room_except(match_id, self.connection.id, &event).await;
            }
            ClientEvent::MarkSeen { match_id } => {
                self.message_service.mark_seen(match_id, user_id).await?;
            }
        }
        Ok(())
    }
}
