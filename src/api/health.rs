use crate::api::MgmtState;
use crate::api::response::ApiResponse;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: checks connectivity to the database.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    let (status_code, response) = probe(&state).await;
    (status_code, Json(response))
}

/// Public health check in the standard response envelope.
pub async fn health(State(state): State<MgmtState>) -> impl IntoResponse {
    let (status_code, response) = probe(&state).await;
    if status_code == StatusCode::OK {
        ApiResponse::ok("Server is healthy", response).into_response()
    } else {
        (status_code, Json(serde_json::json!({ "success": false, "message": "Server is unhealthy", "data": response })))
            .into_response()
    }
}

async fn probe(state: &MgmtState) -> (StatusCode, HealthResponse) {
    match state.health_service.check_store().await {
        Ok(()) => (StatusCode::OK, HealthResponse { status: "ok".to_string(), database: "ok".to_string() }),
        Err(e) => {
            tracing::warn!(error = %e, component = "database", "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse { status: "error".to_string(), database: "error".to_string() },
            )
        }
    }
}
