//! Chat route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::chat;
use crate::state::AppState;

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/chat/rooms/contract/:contract_id",
            get(chat::get_room_for_contract),
        )
        .route("/api/chat/rooms/:room_id/messages", get(chat::get_messages))
        .route("/api/chat/messages", post(chat::send_message))
        .route("/api/chat/messages/:id/read", put(chat::mark_message_read))
        .route("/api/chat/messages/:id", delete(chat::delete_message))
}
