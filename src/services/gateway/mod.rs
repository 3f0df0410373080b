pub(crate) mod session;

use crate::config::WsConfig;
use crate::domain::user::Identity;
use crate::services::gateway::session::Session;
use crate::services::hub::RealtimeHub;
use crate::services::identity_service::IdentityService;
use crate::services::match_service::MatchService;
use crate::services::message_service::MessageService;
use axum::extract::ws::WebSocket;
use opentelemetry::{
    global,
    metrics::{Counter, UpDownCounter},
};

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) active_connections: UpDownCounter<i64>,
    pub(crate) events_total: Counter<u64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("flamr-server");
        Self {
            active_connections: meter
                .i64_up_down_counter("flamr_websocket_active_connections")
                .with_description("Number of active WebSocket connections")
                .build(),
            events_total: meter
                .u64_counter("flamr_websocket_events_total")
                .with_description("Client events received over WebSocket")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point for authenticated WebSocket connections.
#[derive(Clone, Debug)]
pub struct GatewayService {
    identity_service: IdentityService,
    match_service: MatchService,
    message_service: MessageService,
    hub: RealtimeHub,
    config: WsConfig,
    metrics: Metrics,
}

impl GatewayService {
    #[must_use]
    pub fn new(
        identity_service: IdentityService,
        match_service: MatchService,
        message_service: MessageService,
        hub: RealtimeHub,
        config: WsConfig,
    ) -> Self {
        Self { identity_service, match_service, message_service, hub, config, metrics: Metrics::new() }
    }

    pub async fn handle_socket(
        &self,
        socket: WebSocket,
        identity: Identity,
        request_id: String,
        shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let session = Session {
            identity,
            request_id,
            socket,
            identity_service: self.identity_service.clone(),
            match_service: self.match_service.clone(),
            message_service: self.message_service.clone(),
            hub: self.hub.clone(),
            metrics: self.metrics.clone(),
            config: self.config.clone(),
            shutdown_rx,
        };

        session.run().await;
    }
}
