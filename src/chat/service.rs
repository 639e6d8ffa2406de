//! Chat service layer

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::chat::{ChatRoom, Message};
use crate::contract::Contract;

/// Chat service errors
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Room not found")]
    RoomNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Contract not found")]
    ContractNotFound,

    #[error("Only room members may do this")]
    NotMember,

    #[error("Only the sender may delete a message")]
    NotSender,

    #[error("Only the recipient may mark a message read")]
    NotRecipient,
}

impl From<sqlx::Error> for ChatError {
    fn from(e: sqlx::Error) -> Self {
        ChatError::DatabaseError(e.to_string())
    }
}

/// Chat service
#[derive(Clone)]
pub struct ChatService {
    db_pool: PgPool,
}

impl ChatService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Get or create the room belonging to a contract (party-only)
    pub async fn room_for_contract(
        &self,
        user_id: Uuid,
        contract_id: Uuid,
    ) -> Result<ChatRoom, ChatError> {
        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(contract_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ChatError::ContractNotFound)?;

        if !contract.is_party(user_id) {
            return Err(ChatError::NotMember);
        }

        sqlx::query(
            r#"
            INSERT INTO chat_rooms (id, contract_id, client_id, freelancer_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (contract_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(contract.id)
        .bind(contract.client_id)
        .bind(contract.freelancer_id)
        .execute(&self.db_pool)
        .await?;

        let room = sqlx::query_as::<_, ChatRoom>("SELECT * FROM chat_rooms WHERE contract_id = $1")
            .bind(contract_id)
            .fetch_one(&self.db_pool)
            .await?;

        Ok(room)
    }

    /// Send a message into a room (member-only)
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        room_id: Uuid,
        body: &str,
    ) -> Result<Message, ChatError> {
        let room = self.fetch_room(room_id).await?;

        if !room.is_member(sender_id) {
            return Err(ChatError::NotMember);
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, room_id, sender_id, body, is_read)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(room_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(message)
    }

    /// Messages in a room, oldest first (member-only)
    pub async fn get_messages(
        &self,
        user_id: Uuid,
        room_id: Uuid,
    ) -> Result<Vec<Message>, ChatError> {
        let room = self.fetch_room(room_id).await?;

        if !room.is_member(user_id) {
            return Err(ChatError::NotMember);
        }

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE room_id = $1 ORDER BY created_at",
        )
        .bind(room_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(messages)
    }

    /// Mark a message read; only the receiving side may do it
    pub async fn mark_read(&self, user_id: Uuid, message_id: Uuid) -> Result<Message, ChatError> {
        let message = self.fetch_message(message_id).await?;
        let room = self.fetch_room(message.room_id).await?;

        if !room.is_member(user_id) {
            return Err(ChatError::NotMember);
        }

        if message.sender_id == user_id {
            return Err(ChatError::NotRecipient);
        }

        let updated = sqlx::query_as::<_, Message>(
            "UPDATE messages SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(message_id)
        .fetch_optional(&self.db_pool)
        .await?;

        updated.ok_or(ChatError::MessageNotFound)
    }

    /// Delete an own message
    pub async fn delete_message(&self, user_id: Uuid, message_id: Uuid) -> Result<(), ChatError> {
        let message = self.fetch_message(message_id).await?;

        if message.sender_id != user_id {
            return Err(ChatError::NotSender);
        }

        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    async fn fetch_room(&self, id: Uuid) -> Result<ChatRoom, ChatError> {
        sqlx::query_as::<_, ChatRoom>("SELECT * FROM chat_rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ChatError::RoomNotFound)
    }

    async fn fetch_message(&self, id: Uuid) -> Result<Message, ChatError> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ChatError::MessageNotFound)
    }
}
