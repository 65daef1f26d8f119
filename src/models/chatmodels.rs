// models/chatmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local view of a conversation owned by the chat service. Only its
/// existence and activity feed into job status.
#[derive(Debug, Serialize, Clone, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Conversation {
    pub id: Uuid,
    pub job_id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub message_count: i64,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Option<Uuid>, // None for system messages
    pub body: String,
    pub created_at: DateTime<Utc>,
}
