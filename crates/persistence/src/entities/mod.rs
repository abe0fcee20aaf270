//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod board;
pub mod chat;
pub mod group;
pub mod notification;
pub mod user;

pub use board::{CommentEntity, PostEntity};
pub use chat::{ChatMessageEntity, ChatMessageTypeDb, ChatRoomEntity};
pub use group::{
    GroupEntity, GroupMemberEntity, GroupRoleDb, GroupSummaryEntity, InterestTypeDb,
    MemberStatusDb, MemberWithUserEntity,
};
pub use notification::{NotificationEntity, NotificationTypeDb};
pub use user::{RegionEntity, UserEntity, UserStatusDb};
