//! Application services orchestrating repositories, rules and realtime
//! channels.

pub mod board;
pub mod chat;
pub mod membership;
pub mod notification;
pub mod signaling;

pub use board::BoardService;
pub use chat::ChatService;
pub use membership::MembershipService;
pub use notification::{NotificationDispatcher, RealtimeHub, Subscription};
pub use signaling::{PeerHandle, SignalingRelay};
