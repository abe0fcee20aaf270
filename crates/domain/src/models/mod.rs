//! Domain models for the Buddy backend.

pub mod board;
pub mod chat;
pub mod group;
pub mod notification;
pub mod signaling;
pub mod user;

pub use board::{Comment, Post};
pub use chat::{ChatMessage, ChatMessageType, ChatRoom, MessageOrigin};
pub use group::{Group, GroupMember, GroupRole, MemberStatus};
pub use notification::{NewNotification, Notification, NotificationType};
pub use user::{CurrentUser, InterestType, Region, User, UserStatus};
