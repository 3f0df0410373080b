use crate::api::AppState;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::middleware::AuthUser;
use crate::api::response::ApiResponse;
use crate::api::schemas::swipes::{HistoryQuery, IncomingLikes, SwipeHistory, SwipeRequest};
use crate::domain::swipe::SwipeAction;
use crate::error::{AppError, Result};
use axum::{extract::State, response::IntoResponse};

/// Records a like or pass. Responds 201 when the swipe created a new match.
///
/// # Errors
/// Returns `AppError::BadRequest` for missing fields, an unknown action or a self-swipe.
/// Returns `AppError::NotFound`, `AppError::Forbidden` or `AppError::Conflict` when the swipe is rejected.
pub async fn swipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SwipeRequest>,
) -> Result<impl IntoResponse> {
    let (Some(target_id), Some(action)) = (payload.target_user_id, payload.action) else {
        return Err(AppError::BadRequest("targetUserId and action are required".into()));
    };
    let action: SwipeAction = action.parse()?;

    let outcome = state.swipe_service.record_swipe(auth_user.user_id, target_id, action).await?;

    Ok(match (action, outcome.matched, outcome.created) {
        (SwipeAction::Pass, ..) => ApiResponse::ok("Passed", outcome),
        (SwipeAction::Like, false, _) => ApiResponse::ok("Liked", outcome),
        (SwipeAction::Like, true, true) => ApiResponse::created("It's a Match!", outcome),
        (SwipeAction::Like, true, false) => ApiResponse::ok("Already matched", outcome),
    })
}

/// # Errors
/// Returns `AppError::BadRequest` for an invalid page request.
pub async fn history(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let action = query.action.as_deref().and_then(|a| a.parse::<SwipeAction>().ok());
    let (swipes, pagination) =
        state.swipe_service.history(auth_user.user_id, action, query.page, query.limit).await?;

    Ok(ApiResponse::ok("Swipe history fetched", SwipeHistory { swipes, pagination }))
}

/// # Errors
/// Returns `AppError::Database` if the lookup fails.
pub async fn likes_me(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let likes = state.swipe_service.likes_me(auth_user.user_id).await?;
    let count = likes.len();

    Ok(ApiResponse::ok("Incoming likes fetched", IncomingLikes { likes, count }))
}
