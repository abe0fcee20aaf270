//! Chat room and message domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageType {
    Text,
    Image,
    System,
}

impl ChatMessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMessageType::Text => "text",
            ChatMessageType::Image => "image",
            ChatMessageType::System => "system",
        }
    }
}

impl FromStr for ChatMessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ChatMessageType::Text),
            "image" => Ok(ChatMessageType::Image),
            "system" => Ok(ChatMessageType::System),
            _ => Err(format!("Invalid message type: {}", s)),
        }
    }
}

impl fmt::Display for ChatMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who wrote a message.
///
/// System messages have no sender; user messages always have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageOrigin {
    UserAuthored { sender_id: Uuid },
    System,
}

impl MessageOrigin {
    /// Rebuilds the origin from the stored nullable sender column.
    pub fn from_sender(sender_id: Option<Uuid>) -> Self {
        match sender_id {
            Some(sender_id) => MessageOrigin::UserAuthored { sender_id },
            None => MessageOrigin::System,
        }
    }

    pub fn sender_id(&self) -> Option<Uuid> {
        match self {
            MessageOrigin::UserAuthored { sender_id } => Some(*sender_id),
            MessageOrigin::System => None,
        }
    }
}

/// The single chat room of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChatRoom {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: Uuid,
    pub origin: MessageOrigin,
    pub message_type: ChatMessageType,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Response for the room lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChatRoomResponse {
    pub room_id: Uuid,
    pub group_id: Uuid,
}

/// Response for a message history read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChatHistoryResponse {
    pub room_id: Uuid,
    pub messages: Vec<ChatMessage>,
}
