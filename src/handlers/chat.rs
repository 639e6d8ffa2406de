//! Chat HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::chat::{ChatError, ChatRoom, Message, SendMessageRequest};
use crate::error::ApiError;
use crate::handlers::AuthenticatedUser;
use crate::state::AppState;

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::RoomNotFound => ApiError::NotFound("Room not found".to_string()),
            ChatError::MessageNotFound => ApiError::NotFound("Message not found".to_string()),
            ChatError::ContractNotFound => ApiError::NotFound("Contract not found".to_string()),
            ChatError::NotMember => {
                ApiError::Forbidden("Only room members may do this".to_string())
            }
            ChatError::NotSender => {
                ApiError::Forbidden("Only the sender may delete a message".to_string())
            }
            ChatError::NotRecipient => {
                ApiError::Forbidden("Only the recipient may mark a message read".to_string())
            }
            ChatError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// GET /chat/rooms/contract/:contract_id - Room for a contract (created lazily)
pub async fn get_room_for_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(contract_id): Path<Uuid>,
) -> Result<Json<ChatRoom>, ApiError> {
    let room = state
        .chat_service
        .room_for_contract(user.user_id, contract_id)
        .await?;

    Ok(Json(room))
}

/// POST /chat/messages - Send a message
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    request.validate()?;

    let message = state
        .chat_service
        .send_message(user.user_id, request.room_id, &request.body)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /chat/rooms/:room_id/messages - Messages in a room, oldest first
pub async fn get_messages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.chat_service.get_messages(user.user_id, room_id).await?;
    Ok(Json(messages))
}

/// PUT /chat/messages/:id/read - Mark a message read (recipient side)
pub async fn mark_message_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ApiError> {
    let message = state.chat_service.mark_read(user.user_id, id).await?;
    Ok(Json(message))
}

/// DELETE /chat/messages/:id - Delete an own message
pub async fn delete_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.chat_service.delete_message(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
