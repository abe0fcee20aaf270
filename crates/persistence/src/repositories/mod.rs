//! Repository implementations for database operations.

pub mod board;
pub mod chat;
pub mod group;
pub mod group_member;
pub mod notification;
pub mod region;
pub mod user;

pub use board::BoardRepository;
pub use chat::ChatRepository;
pub use group::GroupRepository;
pub use group_member::{ApprovalOutcome, GroupMemberRepository, RejectionOutcome};
pub use notification::NotificationRepository;
pub use region::RegionRepository;
pub use user::{ProfileUpdate, UserRepository};
