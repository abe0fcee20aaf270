//! Chat room repository for database operations.

use chrono::{DateTime, Utc};
use domain::services::MembershipError;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{ChatMessageEntity, ChatMessageTypeDb, ChatRoomEntity};
use crate::error::{on_unique_violation, StoreError};
use crate::metrics::QueryTimer;

/// Creates the chat room of a group on an open transaction.
///
/// A second room for the same group violates `chat_rooms_group_unique`.
pub(crate) async fn insert_room(
    conn: &mut PgConnection,
    group_id: Uuid,
) -> Result<ChatRoomEntity, StoreError> {
    sqlx::query_as::<_, ChatRoomEntity>(
        r#"
        INSERT INTO chat_rooms (group_id)
        VALUES ($1)
        RETURNING id, group_id, created_at
        "#,
    )
    .bind(group_id)
    .fetch_one(conn)
    .await
    .map_err(|e| on_unique_violation(e, MembershipError::DuplicateChatRoom))
}

/// Appends a sender-less SYSTEM message to a room.
pub(crate) async fn insert_system_message(
    conn: &mut PgConnection,
    room_id: Uuid,
    body: &str,
) -> Result<ChatMessageEntity, sqlx::Error> {
    sqlx::query_as::<_, ChatMessageEntity>(
        r#"
        INSERT INTO chat_messages (room_id, sender_id, message_type, body)
        VALUES ($1, NULL, $2, $3)
        RETURNING id, room_id, sender_id, message_type, body, created_at
        "#,
    )
    .bind(room_id)
    .bind(ChatMessageTypeDb::System)
    .bind(body)
    .fetch_one(conn)
    .await
}

/// Appends a SYSTEM message to the room of a group.
pub(crate) async fn insert_group_system_message(
    conn: &mut PgConnection,
    group_id: Uuid,
    body: &str,
) -> Result<ChatMessageEntity, StoreError> {
    let room_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM chat_rooms WHERE group_id = $1")
            .bind(group_id)
            .fetch_optional(&mut *conn)
            .await?;

    let room_id = room_id.ok_or(MembershipError::ChatRoomNotFound)?;
    Ok(insert_system_message(conn, room_id, body).await?)
}

/// Repository for chat rooms and their messages.
#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_room_by_id(&self, id: Uuid) -> Result<Option<ChatRoomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chat_room_by_id");
        let result = sqlx::query_as::<_, ChatRoomEntity>(
            "SELECT id, group_id, created_at FROM chat_rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_room_by_group(
        &self,
        group_id: Uuid,
    ) -> Result<Option<ChatRoomEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chat_room_by_group");
        let result = sqlx::query_as::<_, ChatRoomEntity>(
            "SELECT id, group_id, created_at FROM chat_rooms WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Visible messages of a room created at or after `since`, oldest first.
    pub async fn find_messages_since(
        &self,
        room_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ChatMessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chat_messages_since");
        let result = sqlx::query_as::<_, ChatMessageEntity>(
            r#"
            SELECT id, room_id, sender_id, message_type, body, created_at
            FROM chat_messages
            WHERE room_id = $1 AND is_deleted = false AND created_at >= $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(room_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
