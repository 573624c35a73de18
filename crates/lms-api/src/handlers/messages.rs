//! Direct message handlers

use axum::{extract::State, Json};
use lms_core::UserId;
use lms_service::dto::{
    ConversationResponse, DirectMessageResponse, SendMessageRequest, UnreadCountResponse,
};
use lms_service::MessageService;

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Latest message per counterpart, newest first
///
/// GET /messages/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service.conversations(auth.context()).await?;
    Ok(Json(response))
}

/// Full thread with one user; marks their messages to the caller as read
///
/// GET /messages/conversations/{user_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath<UserId>,
) -> ApiResult<Json<Vec<DirectMessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service.conversation(auth.context(), user_id).await?;
    Ok(Json(response))
}

/// POST /messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<DirectMessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service.send(auth.context(), request).await?;
    Ok(Created(Json(response)))
}

/// GET /messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service.unread_count(auth.context()).await?;
    Ok(Json(response))
}
