use crate::api::AppState;
use crate::api::extract::ApiPath;
use crate::api::middleware::AuthUser;
use crate::api::response::ApiResponse;
use crate::api::schemas::blocks::BlockedUsers;
use crate::error::Result;
use axum::{extract::State, response::IntoResponse};
use uuid::Uuid;

/// # Errors
/// Returns `AppError::BadRequest` when blocking oneself.
/// Returns `AppError::NotFound` if the target does not exist.
pub async fn block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.block_service.block(auth_user.user_id, user_id).await?;
    Ok(ApiResponse::ack("User blocked"))
}

/// # Errors
/// Returns `AppError::Database` if the delete fails.
pub async fn unblock(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.block_service.unblock(auth_user.user_id, user_id).await?;
    Ok(ApiResponse::ack("User unblocked"))
}

/// # Errors
/// Returns `AppError::Database` if the lookup fails.
pub async fn list(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let blocked_users = state.block_service.list_blocked(auth_user.user_id).await?;
    let count = blocked_users.len();

    Ok(ApiResponse::ok("Blocked users fetched", BlockedUsers { blocked_users, count }))
}
