//! Notification routes, including the realtime push stream.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    Json,
};
use domain::models::notification::{
    ListNotificationsResponse, MarkReadResponse, UnreadCountResponse,
};
use futures_util::{SinkExt, StreamExt};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::services::{RealtimeHub, Subscription};

/// Unread notifications, newest first, capped at the configured limit.
///
/// GET /api/v1/notifications/unread
pub async fn list_unread(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<ListNotificationsResponse>, ApiError> {
    let data = state.dispatcher().fetch_unread(caller.user_id).await?;
    let count = data.len();
    Ok(Json(ListNotificationsResponse { data, count }))
}

/// GET /api/v1/notifications/badge-count
pub async fn badge_count(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let count = state.dispatcher().unread_count(caller.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark one of the caller's notifications read. Unknown, foreign or
/// already read ids report `updated: 0`.
///
/// POST /api/v1/notifications/:notification_id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(notification_id): Path<i64>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let updated = state
        .dispatcher()
        .mark_read(caller.user_id, notification_id)
        .await?;
    Ok(Json(MarkReadResponse { updated }))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let updated = state.dispatcher().mark_all_read(caller.user_id).await?;
    Ok(Json(MarkReadResponse { updated }))
}

/// Live push channel. Each committed notification for the caller arrives
/// as one JSON text frame.
///
/// GET (ws) /api/v1/notifications/stream?token=
pub async fn notification_stream(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| async move {
        let subscription = hub.subscribe(caller.user_id);
        run_subscription(socket, hub, subscription).await
    })
}

async fn run_subscription(
    socket: WebSocket,
    hub: std::sync::Arc<RealtimeHub>,
    subscription: Subscription,
) {
    let Subscription {
        id,
        user_id,
        mut rx,
    } = subscription;
    let (mut sender, mut receiver) = socket.split();

    let mut push_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Inbound frames carry nothing; the loop only watches for the close.
    let mut read_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut push_task => read_task.abort(),
        _ = &mut read_task => push_task.abort(),
    }

    hub.unsubscribe(user_id, id);
    debug!(user_id = %user_id, subscription_id = id, "Notification stream closed");
}
