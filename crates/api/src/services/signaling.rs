//! WebRTC signaling relay.
//!
//! Peers are keyed by chat room and user. The relay never inspects SDP or
//! ICE payloads; directed messages are forwarded as the exact text received.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use domain::models::signaling::{classify, ParticipantEvent, SignalKind};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use uuid::Uuid;

struct Peer {
    connection_id: u64,
    tx: UnboundedSender<String>,
}

/// Identifies one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerHandle {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub connection_id: u64,
}

#[derive(Default)]
pub struct SignalingRelay {
    rooms: DashMap<Uuid, DashMap<Uuid, Peer>>,
    next_connection: AtomicU64,
}

impl SignalingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, replacing any previous one for the same
    /// (room, user) pair.
    pub fn connect(&self, room_id: Uuid, user_id: Uuid, tx: UnboundedSender<String>) -> PeerHandle {
        let connection_id = self.next_connection.fetch_add(1, Ordering::Relaxed) + 1;

        let replaced = self
            .rooms
            .entry(room_id)
            .or_default()
            .insert(user_id, Peer { connection_id, tx })
            .is_some();

        if !replaced {
            metrics::gauge!("buddy_signaling_peers").increment(1.0);
        }

        info!(
            room_id = %room_id,
            user_id = %user_id,
            connection_id,
            replaced,
            "Signaling peer connected"
        );

        PeerHandle {
            room_id,
            user_id,
            connection_id,
        }
    }

    /// Route one text frame from `from`.
    pub fn dispatch(&self, from: &PeerHandle, text: &str) {
        match classify(text) {
            Some(SignalKind::Forward { target_user_id }) => {
                if !self.forward(from.room_id, target_user_id, text) {
                    debug!(
                        room_id = %from.room_id,
                        from = %from.user_id,
                        target = %target_user_id,
                        "Signaling target not connected; message dropped"
                    );
                }
            }
            Some(SignalKind::Join) => {
                let event = ParticipantEvent::NewParticipant {
                    user_id: from.user_id,
                };
                self.broadcast(from.room_id, from.user_id, &event.to_json());
            }
            Some(SignalKind::Leave) => {
                let event = ParticipantEvent::ParticipantLeft {
                    user_id: from.user_id,
                };
                self.broadcast(from.room_id, from.user_id, &event.to_json());
            }
            Some(SignalKind::MissingTarget) => {
                debug!(from = %from.user_id, "Directed signaling message without targetUserId");
            }
            Some(SignalKind::Unknown(kind)) => {
                debug!(from = %from.user_id, kind = %kind, "Ignoring unknown signaling message");
            }
            None => {
                debug!(from = %from.user_id, "Ignoring unparseable signaling frame");
            }
        }
    }

    /// Remove the connection if it is still the registered one, tell the
    /// remaining peers and prune the room once empty.
    pub fn disconnect(&self, handle: &PeerHandle) {
        let removed = match self.rooms.get(&handle.room_id) {
            Some(peers) => peers
                .remove_if(&handle.user_id, |_, peer| {
                    peer.connection_id == handle.connection_id
                })
                .is_some(),
            None => false,
        };

        if !removed {
            debug!(
                room_id = %handle.room_id,
                user_id = %handle.user_id,
                connection_id = handle.connection_id,
                "Stale signaling connection closed"
            );
            return;
        }

        metrics::gauge!("buddy_signaling_peers").decrement(1.0);

        let event = ParticipantEvent::ParticipantLeft {
            user_id: handle.user_id,
        };
        self.broadcast(handle.room_id, handle.user_id, &event.to_json());

        self.rooms
            .remove_if(&handle.room_id, |_, peers| peers.is_empty());

        info!(
            room_id = %handle.room_id,
            user_id = %handle.user_id,
            "Signaling peer disconnected"
        );
    }

    pub fn peer_count(&self, room_id: Uuid) -> usize {
        self.rooms.get(&room_id).map(|p| p.len()).unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn forward(&self, room_id: Uuid, target: Uuid, text: &str) -> bool {
        let tx = match self.rooms.get(&room_id) {
            Some(peers) => peers.get(&target).map(|p| p.tx.clone()),
            None => None,
        };

        match tx {
            Some(tx) => tx.send(text.to_string()).is_ok(),
            None => false,
        }
    }

    fn broadcast(&self, room_id: Uuid, except: Uuid, text: &str) {
        // Snapshot the senders so no map guard is held while sending.
        let targets: Vec<UnboundedSender<String>> = match self.rooms.get(&room_id) {
            Some(peers) => peers
                .iter()
                .filter(|entry| *entry.key() != except)
                .map(|entry| entry.value().tx.clone())
                .collect(),
            None => return,
        };

        for tx in targets {
            let _ = tx.send(text.to_string());
        }
    }
}
