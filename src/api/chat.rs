use crate::api::AppState;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::AuthUser;
use crate::api::response::ApiResponse;
use crate::api::schemas::chat::{ConversationList, SendMessageRequest, SentMessage};
use crate::api::schemas::pagination::PageQuery;
use crate::error::Result;
use axum::{extract::State, response::IntoResponse};
use uuid::Uuid;

/// # Errors
/// Returns `AppError::Database` if the lookup fails.
pub async fn conversations(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let conversations = state.conversation_service.list(auth_user.user_id).await?;
    let count = conversations.len();

    Ok(ApiResponse::ok("Conversations fetched", ConversationList { conversations, count }))
}

/// Returns a page of messages, then marks the other member's `sent` messages as delivered.
///
/// # Errors
/// Returns `AppError::BadRequest` for an invalid page request.
/// Returns `AppError::NotFound` or `AppError::Forbidden` when the caller may not read the match.
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = state.message_service.list_messages(match_id, auth_user.user_id, query.page, query.limit).await?;
    state.message_service.record_implied_delivery(match_id, auth_user.user_id).await?;

    Ok(ApiResponse::ok("Messages fetched", page))
}

/// # Errors
/// Returns `AppError::BadRequest` if the content is blank or too long.
/// Returns `AppError::NotFound` or `AppError::Forbidden` when the caller may not use the match.
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state.message_service.send_message(match_id, auth_user.user_id, &payload.content).await?;
    Ok(ApiResponse::created("Message sent", SentMessage { message }))
}

/// # Errors
/// Returns `AppError::NotFound` or `AppError::Forbidden` when the caller may not use the match.
pub async fn mark_seen(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.message_service.mark_seen(match_id, auth_user.user_id).await?;
    Ok(ApiResponse::ack("Messages marked as seen"))
}

/// # Errors
/// Returns `AppError::NotFound` if the match or message does not exist.
/// Returns `AppError::Forbidden` if the caller did not send the message.
pub async fn delete_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiPath((match_id, message_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state.message_service.delete_message(match_id, message_id, auth_user.user_id).await?;
    Ok(ApiResponse::ack("Message deleted"))
}
