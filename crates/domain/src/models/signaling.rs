//! WebRTC signaling frame models.
//!
//! Only the `type` and `targetUserId` fields are interpreted; point-to-point
//! frames are forwarded as the raw text the sender wrote.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the relay should do with an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    /// `offer`, `answer` or `candidate` addressed to one peer.
    Forward { target_user_id: Uuid },
    Join,
    Leave,
    /// Point-to-point frame without a usable `targetUserId`.
    MissingTarget,
    /// Unknown `type` value.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboundHeader {
    #[serde(rename = "type")]
    kind: String,
    target_user_id: Option<String>,
}

/// Reads the routing header of a frame.
///
/// Returns `None` when the text is not a JSON object with a string `type`.
pub fn classify(text: &str) -> Option<SignalKind> {
    let header: InboundHeader = serde_json::from_str(text).ok()?;

    let kind = match header.kind.as_str() {
        "offer" | "answer" | "candidate" => match header
            .target_user_id
            .as_deref()
            .and_then(|t| Uuid::parse_str(t).ok())
        {
            Some(target_user_id) => SignalKind::Forward { target_user_id },
            None => SignalKind::MissingTarget,
        },
        "join" => SignalKind::Join,
        "leave" => SignalKind::Leave,
        other => SignalKind::Unknown(other.to_string()),
    };

    Some(kind)
}

/// Presence frame the relay synthesizes for the other peers of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ParticipantEvent {
    NewParticipant {
        #[serde(rename = "userId")]
        user_id: Uuid,
    },
    ParticipantLeft {
        #[serde(rename = "userId")]
        user_id: Uuid,
    },
}

impl ParticipantEvent {
    pub fn to_json(&self) -> String {
        // Serializing a two-field enum of Uuid cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
