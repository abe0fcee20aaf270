//! Membership rules for groups.
//!
//! Pure checks over already-loaded rows. The persistence layer runs them
//! inside the transaction that holds the relevant row locks, so a check and
//! the write it guards see the same state.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CurrentUser, Group, GroupMember, MemberStatus};

/// Name used in system messages when a user never set one.
pub const FALLBACK_DISPLAY_NAME: &str = "A member";

/// Errors raised by membership operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MembershipError {
    #[error("User already has a membership record for this group")]
    AlreadyMember,

    #[error("Complete your profile before using groups")]
    UserNotActive,

    #[error("Group not found")]
    GroupNotFound,

    #[error("Group member not found")]
    MemberNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Region not found")]
    RegionNotFound,

    #[error("Chat room not found")]
    ChatRoomNotFound,

    #[error("Only the group owner can do this")]
    NotOwner,

    #[error("The owner cannot leave the group")]
    OwnerCannotLeave,

    #[error("The owner cannot be removed from the group")]
    CannotKickSelf,

    #[error("The owner's membership cannot be changed")]
    OwnerMembershipLocked,

    #[error("Only approved members can access this group")]
    NotMember,

    #[error("Only the author can change this")]
    NotAuthor,

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Group has reached its maximum member count")]
    GroupFull,

    #[error("A chat room already exists for this group")]
    DuplicateChatRoom,

    #[error("{0}")]
    Validation(String),
}

impl MembershipError {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            MembershipError::AlreadyMember => "already_member",
            MembershipError::UserNotActive => "user_not_active",
            MembershipError::GroupNotFound => "group_not_found",
            MembershipError::MemberNotFound => "member_not_found",
            MembershipError::UserNotFound => "user_not_found",
            MembershipError::RegionNotFound => "region_not_found",
            MembershipError::ChatRoomNotFound => "chat_room_not_found",
            MembershipError::NotOwner => "not_owner",
            MembershipError::OwnerCannotLeave => "owner_cannot_leave",
            MembershipError::CannotKickSelf => "cannot_kick_self",
            MembershipError::OwnerMembershipLocked => "owner_membership_locked",
            MembershipError::NotMember => "not_member",
            MembershipError::NotAuthor => "not_author",
            MembershipError::PostNotFound => "post_not_found",
            MembershipError::CommentNotFound => "comment_not_found",
            MembershipError::GroupFull => "group_full",
            MembershipError::DuplicateChatRoom => "duplicate_chat_room",
            MembershipError::Validation(_) => "validation_error",
        }
    }
}

/// What an approve call should do with a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalPlan {
    /// Move the row to APPROVED and emit the side effects.
    Transition,
    /// The row is already approved; nothing is written.
    AlreadyApproved,
}

/// What a reject call should do with a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionPlan {
    Transition,
    AlreadyRejected,
}

/// Only ACTIVE users take part in groups.
pub fn ensure_active(actor: &CurrentUser) -> Result<(), MembershipError> {
    if actor.is_active() {
        Ok(())
    } else {
        Err(MembershipError::UserNotActive)
    }
}

pub fn ensure_owner(group: &Group, actor_id: Uuid) -> Result<(), MembershipError> {
    if group.is_owned_by(actor_id) {
        Ok(())
    } else {
        Err(MembershipError::NotOwner)
    }
}

/// An application is only accepted when no row exists for the pair.
pub fn ensure_can_apply(existing: Option<&GroupMember>) -> Result<(), MembershipError> {
    match existing {
        Some(_) => Err(MembershipError::AlreadyMember),
        None => Ok(()),
    }
}

/// Decides an approval given the current row and the group's approved count.
pub fn plan_approval(
    member: &GroupMember,
    approved_count: i64,
    max_member_count: i32,
) -> Result<ApprovalPlan, MembershipError> {
    if member.is_owner() || member.is_approved() {
        return Ok(ApprovalPlan::AlreadyApproved);
    }

    if approved_count >= i64::from(max_member_count) {
        return Err(MembershipError::GroupFull);
    }

    Ok(ApprovalPlan::Transition)
}

pub fn plan_rejection(member: &GroupMember) -> Result<RejectionPlan, MembershipError> {
    if member.is_owner() {
        return Err(MembershipError::OwnerMembershipLocked);
    }

    if member.status == MemberStatus::Rejected {
        Ok(RejectionPlan::AlreadyRejected)
    } else {
        Ok(RejectionPlan::Transition)
    }
}

pub fn ensure_can_leave(member: &GroupMember) -> Result<(), MembershipError> {
    if member.is_owner() {
        Err(MembershipError::OwnerCannotLeave)
    } else {
        Ok(())
    }
}

pub fn ensure_can_kick(
    group: &Group,
    actor_id: Uuid,
    target_user_id: Uuid,
) -> Result<(), MembershipError> {
    ensure_owner(group, actor_id)?;
    if target_user_id == group.owner_id {
        return Err(MembershipError::CannotKickSelf);
    }
    Ok(())
}

/// Board posts and comments are for approved members only.
pub fn ensure_approved(member: Option<&GroupMember>) -> Result<(), MembershipError> {
    match member {
        Some(m) if m.is_approved() => Ok(()),
        _ => Err(MembershipError::NotMember),
    }
}

pub fn ensure_author(author_id: Uuid, actor_id: Uuid) -> Result<(), MembershipError> {
    if author_id == actor_id {
        Ok(())
    } else {
        Err(MembershipError::NotAuthor)
    }
}

/// Earliest message timestamp a member may read.
///
/// Owners are approved at creation, so their fence is the creation time.
pub fn history_fence(member: Option<&GroupMember>) -> Result<DateTime<Utc>, MembershipError> {
    match member {
        Some(m) if m.is_approved() => Ok(m.approved_at.unwrap_or(m.created_at)),
        _ => Err(MembershipError::NotMember),
    }
}

/// Recommendations are matched against the caller's region.
pub fn require_region(actor: &CurrentUser) -> Result<i64, MembershipError> {
    actor
        .region_id
        .ok_or_else(|| MembershipError::Validation("Set a region to get recommendations".into()))
}

pub fn group_created_message(owner_name: &str) -> String {
    format!("{} created the group and joined the chat.", owner_name)
}

pub fn member_joined_message(member_name: &str) -> String {
    format!("{} joined the chat.", member_name)
}
