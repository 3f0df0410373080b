use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Authentication failed")]
    AuthError,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AuthError => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// The stable, user-facing text for this error. Store failures never leak their cause.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal => "Internal server error".to_string(),
            Self::AuthError => "Not authenticated".to_string(),
            Self::Forbidden(msg) | Self::NotFound(msg) | Self::BadRequest(msg) | Self::Conflict(msg) => msg.clone(),
        }
    }

    /// Logs the error at a level matching its severity.
    pub fn log(&self) {
        match self {
            Self::Database(e) => tracing::error!(error = %e, "Database error"),
            Self::Internal => tracing::error!("Internal server error occurred"),
            Self::AuthError => tracing::debug!("Authentication failed"),
            Self::Forbidden(msg) => tracing::debug!(message = %msg, "Forbidden"),
            Self::NotFound(msg) => tracing::debug!(message = %msg, "Resource not found"),
            Self::BadRequest(msg) => tracing::debug!(message = %msg, "Bad request"),
            Self::Conflict(msg) => tracing::debug!(message = %msg, "Conflict"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "success": false,
            "message": self.client_message(),
        }));

        (self.status_code(), body).into_response()
    }
}
