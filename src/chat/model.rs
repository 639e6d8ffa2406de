//! Chat models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Chat room between the two parties of a contract
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ChatRoom {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ChatRoom {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.freelancer_id == user_id
    }
}

/// Chat message
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub room_id: Uuid,
    #[validate(length(min = 1, max = 4000))]
    pub body: String,
}
