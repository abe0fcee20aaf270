//! Chat room and message entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ChatMessageType, MessageOrigin};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for chat_message_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "chat_message_type", rename_all = "lowercase")]
pub enum ChatMessageTypeDb {
    Text,
    Image,
    System,
}

impl From<ChatMessageTypeDb> for ChatMessageType {
    fn from(db: ChatMessageTypeDb) -> Self {
        match db {
            ChatMessageTypeDb::Text => ChatMessageType::Text,
            ChatMessageTypeDb::Image => ChatMessageType::Image,
            ChatMessageTypeDb::System => ChatMessageType::System,
        }
    }
}

/// Database row mapping for the chat_rooms table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatRoomEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ChatRoomEntity> for domain::models::ChatRoom {
    fn from(entity: ChatRoomEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the chat_messages table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageEntity {
    pub id: i64,
    pub room_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub message_type: ChatMessageTypeDb,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessageEntity> for domain::models::ChatMessage {
    fn from(entity: ChatMessageEntity) -> Self {
        Self {
            id: entity.id,
            room_id: entity.room_id,
            origin: MessageOrigin::from_sender(entity.sender_id),
            message_type: entity.message_type.into(),
            body: entity.body,
            created_at: entity.created_at,
        }
    }
}
