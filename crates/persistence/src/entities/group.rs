//! Group and group member entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::group::{GroupRole, MemberStatus};
use domain::models::InterestType;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for interest_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "interest_type", rename_all = "lowercase")]
pub enum InterestTypeDb {
    Running,
    Reading,
    Gaming,
    Music,
    Movie,
    Cooking,
    Travel,
    Study,
}

impl From<InterestTypeDb> for InterestType {
    fn from(db: InterestTypeDb) -> Self {
        match db {
            InterestTypeDb::Running => InterestType::Running,
            InterestTypeDb::Reading => InterestType::Reading,
            InterestTypeDb::Gaming => InterestType::Gaming,
            InterestTypeDb::Music => InterestType::Music,
            InterestTypeDb::Movie => InterestType::Movie,
            InterestTypeDb::Cooking => InterestType::Cooking,
            InterestTypeDb::Travel => InterestType::Travel,
            InterestTypeDb::Study => InterestType::Study,
        }
    }
}

impl From<InterestType> for InterestTypeDb {
    fn from(interest: InterestType) -> Self {
        match interest {
            InterestType::Running => InterestTypeDb::Running,
            InterestType::Reading => InterestTypeDb::Reading,
            InterestType::Gaming => InterestTypeDb::Gaming,
            InterestType::Music => InterestTypeDb::Music,
            InterestType::Movie => InterestTypeDb::Movie,
            InterestType::Cooking => InterestTypeDb::Cooking,
            InterestType::Travel => InterestTypeDb::Travel,
            InterestType::Study => InterestTypeDb::Study,
        }
    }
}

/// Database enum for group_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
pub enum GroupRoleDb {
    Owner,
    Member,
}

impl From<GroupRoleDb> for GroupRole {
    fn from(db_role: GroupRoleDb) -> Self {
        match db_role {
            GroupRoleDb::Owner => GroupRole::Owner,
            GroupRoleDb::Member => GroupRole::Member,
        }
    }
}

impl From<GroupRole> for GroupRoleDb {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Owner => GroupRoleDb::Owner,
            GroupRole::Member => GroupRoleDb::Member,
        }
    }
}

/// Database enum for member_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_status", rename_all = "lowercase")]
pub enum MemberStatusDb {
    Applied,
    Approved,
    Rejected,
}

impl From<MemberStatusDb> for MemberStatus {
    fn from(db_status: MemberStatusDb) -> Self {
        match db_status {
            MemberStatusDb::Applied => MemberStatus::Applied,
            MemberStatusDb::Approved => MemberStatus::Approved,
            MemberStatusDb::Rejected => MemberStatus::Rejected,
        }
    }
}

impl From<MemberStatus> for MemberStatusDb {
    fn from(status: MemberStatus) -> Self {
        match status {
            MemberStatus::Applied => MemberStatusDb::Applied,
            MemberStatus::Approved => MemberStatusDb::Approved,
            MemberStatus::Rejected => MemberStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub interest: InterestTypeDb,
    pub region_id: i64,
    pub owner_id: Uuid,
    pub min_member_count: i32,
    pub max_member_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            image_url: entity.image_url,
            interest: entity.interest.into(),
            region_id: entity.region_id,
            owner_id: entity.owner_id,
            min_member_count: entity.min_member_count,
            max_member_count: entity.max_member_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Group row joined with its region name and approved member count.
#[derive(Debug, Clone, FromRow)]
pub struct GroupSummaryEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub interest: InterestTypeDb,
    pub region_name: String,
    pub member_count: i64,
    pub min_member_count: i32,
    pub max_member_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<GroupSummaryEntity> for domain::models::group::GroupSummary {
    fn from(entity: GroupSummaryEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            image_url: entity.image_url,
            interest: entity.interest.into(),
            region: entity.region_name,
            member_count: entity.member_count,
            min_member_count: entity.min_member_count,
            max_member_count: entity.max_member_count,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the group_members table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMemberEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub status: MemberStatusDb,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupMemberEntity> for domain::models::GroupMember {
    fn from(entity: GroupMemberEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            status: entity.status.into(),
            approved_at: entity.approved_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Member row joined with the user's public profile.
#[derive(Debug, Clone, FromRow)]
pub struct MemberWithUserEntity {
    pub member_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MemberWithUserEntity> for domain::models::group::MemberResponse {
    fn from(entity: MemberWithUserEntity) -> Self {
        Self {
            user_id: entity.user_id,
            display_name: entity.display_name,
            profile_image_url: entity.profile_image_url,
            role: entity.role.into(),
        }
    }
}

impl From<MemberWithUserEntity> for domain::models::group::ApplicationResponse {
    fn from(entity: MemberWithUserEntity) -> Self {
        Self {
            member_id: entity.member_id,
            user_id: entity.user_id,
            display_name: entity.display_name,
            profile_image_url: entity.profile_image_url,
            applied_at: entity.created_at,
        }
    }
}
