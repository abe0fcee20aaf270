//! Chat room routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::chat::{ChatHistoryResponse, ChatRoomResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// GET /api/v1/chat-rooms/group/:group_id
pub async fn get_room_for_group(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ChatRoomResponse>, ApiError> {
    Ok(Json(state.chat().room_for_group(&actor, group_id).await?))
}

/// Messages since the caller joined, oldest first.
///
/// GET /api/v1/chat-rooms/:room_id/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(room_id): Path<Uuid>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    Ok(Json(state.chat().messages(&actor, room_id).await?))
}
