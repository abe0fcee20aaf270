//! Chat room lookup and join-fenced history.

use domain::models::chat::{ChatHistoryResponse, ChatRoomResponse};
use domain::models::{ChatMessage, CurrentUser, GroupMember};
use domain::services::membership;
use domain::services::MembershipError;
use persistence::repositories::{ChatRepository, GroupMemberRepository, GroupRepository};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct ChatService {
    chat: ChatRepository,
    groups: GroupRepository,
    members: GroupMemberRepository,
}

impl ChatService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            chat: ChatRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            members: GroupMemberRepository::new(pool),
        }
    }

    async fn membership_of(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMember>, ApiError> {
        Ok(self
            .members
            .find_by_group_and_user(group_id, user_id)
            .await?
            .map(GroupMember::from))
    }

    /// Room id of a group, for its approved members.
    pub async fn room_for_group(
        &self,
        actor: &CurrentUser,
        group_id: Uuid,
    ) -> Result<ChatRoomResponse, ApiError> {
        if self.groups.find_by_id(group_id).await?.is_none() {
            return Err(MembershipError::GroupNotFound.into());
        }

        let member = self.membership_of(group_id, actor.user_id).await?;
        if !member.as_ref().is_some_and(GroupMember::is_approved) {
            return Err(MembershipError::NotMember.into());
        }

        let room = self
            .chat
            .find_room_by_group(group_id)
            .await?
            .ok_or(ApiError::Membership(MembershipError::ChatRoomNotFound))?;

        Ok(ChatRoomResponse {
            room_id: room.id,
            group_id: room.group_id,
        })
    }

    /// Messages the caller may read: everything sent at or after their
    /// approval, oldest first.
    pub async fn messages(
        &self,
        actor: &CurrentUser,
        room_id: Uuid,
    ) -> Result<ChatHistoryResponse, ApiError> {
        let room = self
            .chat
            .find_room_by_id(room_id)
            .await?
            .ok_or(ApiError::Membership(MembershipError::ChatRoomNotFound))?;

        let member = self.membership_of(room.group_id, actor.user_id).await?;
        let since = membership::history_fence(member.as_ref())?;

        let messages: Vec<ChatMessage> = self
            .chat
            .find_messages_since(room.id, since)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        debug!(
            room_id = %room.id,
            user_id = %actor.user_id,
            since = %since,
            count = messages.len(),
            "Loaded chat history"
        );

        Ok(ChatHistoryResponse {
            room_id: room.id,
            messages,
        })
    }
}
