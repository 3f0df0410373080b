use crate::config::Config;
use crate::services::block_service::BlockService;
use crate::services::conversation_service::ConversationService;
use crate::services::gateway::GatewayService;
use crate::services::health_service::HealthService;
use crate::services::identity_service::IdentityService;
use crate::services::match_service::MatchService;
use crate::services::message_service::MessageService;
use crate::services::swipe_service::SwipeService;
use axum::body::Body;
use axum::extract::FromRef;
use axum::http::{HeaderName, Request};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod blocks;
pub mod chat;
pub mod extract;
pub mod gateway;
pub mod health;
pub mod matches;
pub mod middleware;
pub mod response;
pub mod schemas;
pub mod swipes;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub identity_service: IdentityService,
    pub swipe_service: SwipeService,
    pub match_service: MatchService,
    pub message_service: MessageService,
    pub conversation_service: ConversationService,
    pub block_service: BlockService,
    pub gateway_service: GatewayService,
    pub health_service: HealthService,
    pub shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

impl FromRef<AppState> for MgmtState {
    fn from_ref(state: &AppState) -> Self {
        Self { health_service: state.health_service.clone() }
    }
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub identity_service: IdentityService,
    pub swipe_service: SwipeService,
    pub match_service: MatchService,
    pub message_service: MessageService,
    pub conversation_service: ConversationService,
    pub block_service: BlockService,
    pub gateway_service: GatewayService,
    pub health_service: HealthService,
}

/// Configures and returns the primary application router. Every route lives under `/api`.
pub fn app_router(
    config: Config,
    services: ServiceContainer,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> Router {
    let state = AppState {
        config,
        identity_service: services.identity_service,
        swipe_service: services.swipe_service,
        match_service: services.match_service,
        message_service: services.message_service,
        conversation_service: services.conversation_service,
        block_service: services.block_service,
        gateway_service: services.gateway_service,
        health_service: services.health_service,
        shutdown_rx,
    };

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/swipes", post(swipes::swipe))
        .route("/swipes/history", get(swipes::history))
        .route("/swipes/likes-me", get(swipes::likes_me))
        .route("/matches", get(matches::list))
        .route("/matches/check/{userId}", get(matches::check))
        .route("/matches/{matchId}", get(matches::get).delete(matches::unmatch))
        .route("/chat/conversations", get(chat::conversations))
        .route("/chat/{matchId}/messages", get(chat::list_messages).post(chat::send_message))
        .route("/chat/{matchId}/messages/{messageId}", delete(chat::delete_message))
        .route("/chat/{matchId}/seen", put(chat::mark_seen))
        .route("/blocks", get(blocks::list))
        .route("/blocks/{userId}", post(blocks::block).delete(blocks::unblock))
        .route("/gateway", get(gateway::websocket_handler));

    Router::new()
        .nest("/api", api_routes)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
