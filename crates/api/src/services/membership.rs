//! Group membership lifecycle.
//!
//! Rule checks live in `domain::services::membership`; transactional writes
//! live in the repositories. This service sequences the two and pushes the
//! committed notifications.

use domain::models::group::{
    ApplicationResponse, CreateGroupRequest, GroupDetail, GroupSummary, ListGroupsQuery,
    MemberResponse, MembershipResponse, UpdateGroupRequest,
};
use domain::models::{CurrentUser, Group, GroupMember, Notification};
use domain::services::membership::{self, FALLBACK_DISPLAY_NAME};
use domain::services::MembershipError;
use persistence::repositories::{
    ApprovalOutcome, GroupMemberRepository, GroupRepository, RegionRepository, RejectionOutcome,
};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::notification::NotificationDispatcher;

#[derive(Clone)]
pub struct MembershipService {
    groups: GroupRepository,
    members: GroupMemberRepository,
    regions: RegionRepository,
    dispatcher: NotificationDispatcher,
}

impl MembershipService {
    pub fn new(pool: PgPool, dispatcher: NotificationDispatcher) -> Self {
        Self {
            groups: GroupRepository::new(pool.clone()),
            members: GroupMemberRepository::new(pool.clone()),
            regions: RegionRepository::new(pool),
            dispatcher,
        }
    }

    async fn load_group(&self, group_id: Uuid) -> Result<Group, ApiError> {
        self.groups
            .find_by_id(group_id)
            .await?
            .map(Group::from)
            .ok_or(ApiError::Membership(MembershipError::GroupNotFound))
    }

    async fn region_name(&self, region_id: i64) -> Result<String, ApiError> {
        self.regions
            .find_by_id(region_id)
            .await?
            .map(|r| r.name)
            .ok_or(ApiError::Membership(MembershipError::RegionNotFound))
    }

    pub async fn create_group(
        &self,
        actor: &CurrentUser,
        request: &CreateGroupRequest,
    ) -> Result<GroupDetail, ApiError> {
        membership::ensure_active(actor)?;
        self.region_name(request.region_id).await?;

        let (group, room) = self
            .groups
            .create_with_room(
                actor.user_id,
                actor.name_or(FALLBACK_DISPLAY_NAME),
                request,
            )
            .await?;

        info!(
            group_id = %group.id,
            room_id = %room.id,
            owner_id = %actor.user_id,
            "Group created"
        );
        metrics::counter!("buddy_groups_created_total").increment(1);

        self.group_details(group.id).await
    }

    pub async fn update_group(
        &self,
        actor: &CurrentUser,
        group_id: Uuid,
        request: &UpdateGroupRequest,
    ) -> Result<GroupDetail, ApiError> {
        membership::ensure_active(actor)?;
        let group = self.load_group(group_id).await?;
        membership::ensure_owner(&group, actor.user_id)?;
        self.region_name(request.region_id).await?;

        self.groups
            .update(group_id, request)
            .await?
            .ok_or(ApiError::Membership(MembershipError::GroupNotFound))?;

        info!(group_id = %group_id, "Group updated");
        self.group_details(group_id).await
    }

    pub async fn delete_group(&self, actor: &CurrentUser, group_id: Uuid) -> Result<(), ApiError> {
        membership::ensure_active(actor)?;
        let group = self.load_group(group_id).await?;
        membership::ensure_owner(&group, actor.user_id)?;

        let deleted = self.groups.delete(group_id).await?;
        if deleted == 0 {
            return Err(MembershipError::GroupNotFound.into());
        }

        info!(group_id = %group_id, owner_id = %actor.user_id, "Group deleted");
        Ok(())
    }

    /// The group with its approved members, owner first.
    pub async fn group_details(&self, group_id: Uuid) -> Result<GroupDetail, ApiError> {
        let group = self.load_group(group_id).await?;
        let region = self.region_name(group.region_id).await?;
        let members: Vec<MemberResponse> = self
            .members
            .list_approved(group_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        let member_count = self.approved_member_count(group_id).await?;

        Ok(GroupDetail {
            id: group.id,
            title: group.title,
            description: group.description,
            image_url: group.image_url,
            interest: group.interest,
            region,
            owner_id: group.owner_id,
            min_member_count: group.min_member_count,
            max_member_count: group.max_member_count,
            member_count,
            members,
            created_at: group.created_at,
        })
    }

    pub async fn list_groups(&self, query: &ListGroupsQuery) -> Result<Vec<GroupSummary>, ApiError> {
        let rows = self.groups.list(query.interest, query.region_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn my_groups(&self, actor: &CurrentUser) -> Result<Vec<GroupSummary>, ApiError> {
        let rows = self.groups.list_for_member(actor.user_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn recommended_groups(
        &self,
        actor: &CurrentUser,
    ) -> Result<Vec<GroupSummary>, ApiError> {
        let region_id = membership::require_region(actor)?;
        let rows = self
            .groups
            .recommended(actor.user_id, &actor.interests, region_id)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// File an application and notify the owner.
    pub async fn request_to_join(
        &self,
        actor: &CurrentUser,
        group_id: Uuid,
    ) -> Result<MembershipResponse, ApiError> {
        membership::ensure_active(actor)?;
        let group = self.load_group(group_id).await?;

        let existing = self
            .members
            .find_by_group_and_user(group_id, actor.user_id)
            .await?
            .map(GroupMember::from);
        membership::ensure_can_apply(existing.as_ref())?;

        let (member, notification) = self.members.apply(&group, actor).await?;

        info!(
            group_id = %group_id,
            member_id = %member.id,
            applicant_id = %actor.user_id,
            "Join request filed"
        );

        self.dispatcher.push(&Notification::from(notification)).await;
        Ok(GroupMember::from(member).into())
    }

    pub async fn approve(
        &self,
        actor: &CurrentUser,
        member_id: Uuid,
    ) -> Result<MembershipResponse, ApiError> {
        membership::ensure_active(actor)?;
        match self.members.approve(member_id, actor.user_id).await? {
            ApprovalOutcome::Approved {
                member,
                notification,
            } => {
                info!(
                    group_id = %member.group_id,
                    member_id = %member.id,
                    user_id = %member.user_id,
                    "Join request approved"
                );
                self.dispatcher.push(&Notification::from(notification)).await;
                Ok(GroupMember::from(member).into())
            }
            ApprovalOutcome::Unchanged(member) => {
                debug!(member_id = %member.id, "Member already approved");
                Ok(GroupMember::from(member).into())
            }
        }
    }

    pub async fn reject(
        &self,
        actor: &CurrentUser,
        member_id: Uuid,
    ) -> Result<MembershipResponse, ApiError> {
        membership::ensure_active(actor)?;
        match self.members.reject(member_id, actor.user_id).await? {
            RejectionOutcome::Rejected {
                member,
                notification,
            } => {
                info!(
                    group_id = %member.group_id,
                    member_id = %member.id,
                    user_id = %member.user_id,
                    "Join request rejected"
                );
                self.dispatcher.push(&Notification::from(notification)).await;
                Ok(GroupMember::from(member).into())
            }
            RejectionOutcome::Unchanged(member) => {
                debug!(member_id = %member.id, "Member already rejected");
                Ok(GroupMember::from(member).into())
            }
        }
    }

    pub async fn leave(&self, actor: &CurrentUser, group_id: Uuid) -> Result<(), ApiError> {
        membership::ensure_active(actor)?;
        self.load_group(group_id).await?;

        let member = self
            .members
            .find_by_group_and_user(group_id, actor.user_id)
            .await?
            .map(GroupMember::from)
            .ok_or(ApiError::Membership(MembershipError::MemberNotFound))?;
        membership::ensure_can_leave(&member)?;

        self.remove(&member).await?;
        info!(group_id = %group_id, user_id = %actor.user_id, "Member left group");
        Ok(())
    }

    pub async fn kick(
        &self,
        actor: &CurrentUser,
        group_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), ApiError> {
        membership::ensure_active(actor)?;
        let group = self.load_group(group_id).await?;
        membership::ensure_can_kick(&group, actor.user_id, target_user_id)?;

        let member = self
            .members
            .find_by_group_and_user(group_id, target_user_id)
            .await?
            .map(GroupMember::from)
            .ok_or(ApiError::Membership(MembershipError::MemberNotFound))?;

        self.remove(&member).await?;
        info!(
            group_id = %group_id,
            user_id = %target_user_id,
            owner_id = %actor.user_id,
            "Member removed from group"
        );
        Ok(())
    }

    async fn remove(&self, member: &GroupMember) -> Result<(), ApiError> {
        // The delete only matches MEMBER rows; zero means the row vanished
        // or is the owner's.
        if self.members.delete(member.id).await? == 0 {
            return Err(MembershipError::MemberNotFound.into());
        }
        Ok(())
    }

    pub async fn approved_member_count(&self, group_id: Uuid) -> Result<i64, ApiError> {
        Ok(self.members.count_approved(group_id).await?)
    }

    /// Pending applications, for the owner only.
    pub async fn list_applications(
        &self,
        actor: &CurrentUser,
        group_id: Uuid,
    ) -> Result<Vec<ApplicationResponse>, ApiError> {
        membership::ensure_active(actor)?;
        let group = self.load_group(group_id).await?;
        membership::ensure_owner(&group, actor.user_id)?;

        let rows = self.members.list_applications(group_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
