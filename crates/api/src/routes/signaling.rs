//! WebRTC signaling WebSocket.
//!
//! The peer is identified by `chat_room_id` from the query string and the
//! user from the access token. A connection missing either is accepted and
//! then closed right away with 1007 so browsers see a definite reason.

use std::borrow::Cow;
use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use shared::jwt::JwtConfig;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::services::SignalingRelay;

#[derive(Debug, Default, Deserialize)]
pub struct SignalingQuery {
    pub chat_room_id: Option<String>,
    pub token: Option<String>,
}

/// Why a signaling connection was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refusal {
    MissingRoom,
    MissingUser,
}

impl Refusal {
    fn reason(self) -> &'static str {
        match self {
            Refusal::MissingRoom => "chat_room_id is missing or malformed",
            Refusal::MissingUser => "user is missing or token invalid",
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn parse_room(query: &SignalingQuery) -> Result<Uuid, Refusal> {
    query
        .chat_room_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id.trim()).ok())
        .ok_or(Refusal::MissingRoom)
}

/// Resolves the (room, user) pair a connection would register under.
fn resolve_peer(
    jwt: &JwtConfig,
    headers: &HeaderMap,
    query: &SignalingQuery,
) -> Result<(Uuid, Uuid), Refusal> {
    let room_id = parse_room(query)?;
    let token = bearer_token(headers)
        .or(query.token.as_deref())
        .filter(|t| !t.is_empty())
        .ok_or(Refusal::MissingUser)?;
    let user_id = jwt
        .resolve_user_id(token)
        .map_err(|_| Refusal::MissingUser)?;
    Ok((room_id, user_id))
}

/// GET (ws) /api/v1/signaling?chat_room_id=&token=
pub async fn signaling_ws(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Option<Query<SignalingQuery>>,
    ws: WebSocketUpgrade,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let identity = resolve_peer(&state.jwt, &headers, &query);

    let ws = ws.max_message_size(state.config.realtime.max_signaling_frame_bytes);

    match identity {
        Ok((room_id, user_id)) => {
            let relay = state.relay.clone();
            ws.on_upgrade(move |socket| {
                let (sender, receiver) = socket.split();
                run_peer(sender, receiver, relay, room_id, user_id)
            })
        }
        Err(refusal) => {
            debug!(reason = refusal.reason(), "Refusing signaling connection");
            ws.on_upgrade(move |socket| refuse(socket, refusal))
        }
    }
}

async fn refuse<W>(mut sink: W, refusal: Refusal)
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let frame = CloseFrame {
        code: close_code::INVALID,
        reason: Cow::Borrowed(refusal.reason()),
    };
    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Failed to send signaling close frame");
    }
}

async fn run_peer<W, R, E>(
    mut sender: W,
    mut receiver: R,
    relay: Arc<SignalingRelay>,
    room_id: Uuid,
    user_id: Uuid,
) where
    W: Sink<Message> + Send + Unpin + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = relay.connect(room_id, user_id, tx);

    // Drains this peer's queue so a slow socket never blocks the senders.
    let mut write_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => relay.dispatch(&handle, &text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(
                        room_id = %room_id,
                        user_id = %user_id,
                        error = %e,
                        "Signaling socket error"
                    );
                    break;
                }
            },
            // Replaced by a newer connection for the same pair.
            _ = &mut write_task => break,
        }
    }

    relay.disconnect(&handle);
    write_task.abort();
}
