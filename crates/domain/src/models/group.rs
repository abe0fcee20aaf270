//! Group and membership domain models for meetups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::user::InterestType;

/// Role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Owner,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Owner => "owner",
            GroupRole::Member => "member",
        }
    }

    /// Returns true if this role decides on applications and kicks members
    pub fn can_manage_members(&self) -> bool {
        matches!(self, GroupRole::Owner)
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(GroupRole::Owner),
            "member" => Ok(GroupRole::Member),
            _ => Err(format!("Invalid group role: {}", s)),
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Applied,
    Approved,
    Rejected,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Applied => "applied",
            MemberStatus::Approved => "approved",
            MemberStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "applied" => Ok(MemberStatus::Applied),
            "approved" => Ok(MemberStatus::Approved),
            "rejected" => Ok(MemberStatus::Rejected),
            _ => Err(format!("Invalid member status: {}", s)),
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A meetup group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub interest: InterestType,
    pub region_id: i64,
    pub owner_id: Uuid,
    pub min_member_count: i32,
    pub max_member_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// A user's join record for a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub status: MemberStatus,
    /// Set when the member was approved; chat history is fenced at this instant.
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupMember {
    pub fn is_owner(&self) -> bool {
        self.role == GroupRole::Owner
    }

    pub fn is_approved(&self) -> bool {
        self.status == MemberStatus::Approved
    }
}

fn validate_create_counts(request: &CreateGroupRequest) -> Result<(), ValidationError> {
    shared::validation::validate_member_range(request.min_member_count, request.max_member_count)
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_create_counts"))]
pub struct CreateGroupRequest {
    #[validate(length(
        min = 1,
        max = 60,
        message = "Title must be between 1 and 60 characters"
    ))]
    pub title: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,

    #[validate(
        length(max = 512, message = "Image URL must be at most 512 characters"),
        custom(function = "shared::validation::validate_image_url")
    )]
    pub image_url: String,

    pub interest: InterestType,

    pub region_id: i64,

    #[validate(range(min = 2, max = 100, message = "Minimum members must be between 2 and 100"))]
    pub min_member_count: i32,

    #[validate(range(min = 2, max = 100, message = "Maximum members must be between 2 and 100"))]
    pub max_member_count: i32,
}

/// Request payload for updating a group.
///
/// Member counts are fixed at creation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGroupRequest {
    #[validate(length(
        min = 1,
        max = 60,
        message = "Title must be between 1 and 60 characters"
    ))]
    pub title: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,

    #[validate(
        length(max = 512, message = "Image URL must be at most 512 characters"),
        custom(function = "shared::validation::validate_image_url")
    )]
    pub image_url: String,

    pub interest: InterestType,

    pub region_id: i64,
}

/// Query parameters for listing groups.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsQuery {
    pub interest: Option<InterestType>,
    pub region_id: Option<i64>,
}

/// Group summary used by every listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub interest: InterestType,
    pub region: String,
    pub member_count: i64,
    pub min_member_count: i32,
    pub max_member_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Approved member as shown on the group page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberResponse {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: GroupRole,
}

/// Response for group detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub interest: InterestType,
    pub region: String,
    pub owner_id: Uuid,
    pub min_member_count: i32,
    pub max_member_count: i32,
    pub member_count: i64,
    pub members: Vec<MemberResponse>,
    pub created_at: DateTime<Utc>,
}

/// Response for listing groups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsResponse {
    pub data: Vec<GroupSummary>,
    pub count: usize,
}

/// A pending application, as listed to the group owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ApplicationResponse {
    pub member_id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub applied_at: DateTime<Utc>,
}

/// Response after a membership transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MembershipResponse {
    pub member_id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub status: MemberStatus,
}

impl From<GroupMember> for MembershipResponse {
    fn from(member: GroupMember) -> Self {
        Self {
            member_id: member.id,
            group_id: member.group_id,
            user_id: member.user_id,
            role: member.role,
            status: member.status,
        }
    }
}
