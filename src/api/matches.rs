use crate::api::AppState;
use crate::api::extract::ApiPath;
use crate::api::middleware::AuthUser;
use crate::api::response::ApiResponse;
use crate::api::schemas::matches::MatchList;
use crate::error::Result;
use axum::{extract::State, response::IntoResponse};
use uuid::Uuid;

/// # Errors
/// Returns `AppError::Database` if the lookup fails.
pub async fn list(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let matches = state.match_service.list(auth_user.user_id).await?;
    let count = matches.len();

    Ok(ApiResponse::ok("Matches fetched", MatchList { matches, count }))
}

/// # Errors
/// Returns `AppError::NotFound` if the match does not exist.
/// Returns `AppError::Forbidden` if the caller is not a member.
pub async fn get(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let overview = state.match_service.get(match_id, auth_user.user_id).await?;
    Ok(ApiResponse::ok("Match fetched", overview))
}

/// # Errors
/// Returns `AppError::NotFound` if the match does not exist.
/// Returns `AppError::Forbidden` if the caller is not a member.
pub async fn unmatch(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.match_service.unmatch(match_id, auth_user.user_id).await?;
    Ok(ApiResponse::ack("Unmatched successfully"))
}

/// # Errors
/// Returns `AppError::Database` if the lookup fails.
pub async fn check(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(other_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let check = state.match_service.check(auth_user.user_id, other_id).await?;
    Ok(ApiResponse::ok("Match status", check))
}
