use crate::api::AppState;
use crate::api::extract::ApiQuery;
use crate::api::middleware::bearer_token;
use crate::api::schemas::gateway::WsParams;
use crate::error::{AppError, Result};
use axum::{
    extract::{State, ws::WebSocketUpgrade},
    http::{Extensions, HeaderMap},
    response::IntoResponse,
};
use tower_http::request_id::RequestId;

/// Authenticates the handshake and hands the upgraded socket to the gateway.
///
/// The token comes from the `token` query parameter or an `Authorization: Bearer` header.
///
/// # Errors
/// Returns `AppError::AuthError` if no valid token is supplied.
/// Returns `AppError::Forbidden` if the account is banned.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ApiQuery(params): ApiQuery<WsParams>,
    headers: HeaderMap,
    extensions: Extensions,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let request_id = extensions
        .get::<RequestId>()
        .map(|id| id.header_value().to_str().unwrap_or_default().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let token = params.token.as_deref().filter(|t| !t.is_empty()).or_else(|| bearer_token(&headers));
    let Some(token) = token else {
        tracing::warn!("WebSocket handshake rejected: missing token");
        return Err(AppError::AuthError);
    };

    let identity = state.identity_service.authenticate(token).await.inspect_err(|e| {
        tracing::warn!(error = %e, "WebSocket handshake rejected");
    })?;

    let gateway = state.gateway_service.clone();
    let shutdown_rx = state.shutdown_rx.clone();
    Ok(ws.on_upgrade(move |socket| async move {
        gateway.handle_socket(socket, identity, request_id, shutdown_rx).await;
    }))
}
