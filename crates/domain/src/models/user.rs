//! User, profile and region domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Onboarding state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Signed in through OAuth but the profile has not been filled in.
    Incomplete,
    Active,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Incomplete => "incomplete",
            UserStatus::Active => "active",
            UserStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incomplete" => Ok(UserStatus::Incomplete),
            "active" => Ok(UserStatus::Active),
            "deleted" => Ok(UserStatus::Deleted),
            _ => Err(format!("Invalid user status: {}", s)),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interest tags used for groups and user profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestType {
    Running,
    Reading,
    Gaming,
    Music,
    Movie,
    Cooking,
    Travel,
    Study,
}

impl InterestType {
    pub const ALL: [InterestType; 8] = [
        InterestType::Running,
        InterestType::Reading,
        InterestType::Gaming,
        InterestType::Music,
        InterestType::Movie,
        InterestType::Cooking,
        InterestType::Travel,
        InterestType::Study,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestType::Running => "running",
            InterestType::Reading => "reading",
            InterestType::Gaming => "gaming",
            InterestType::Music => "music",
            InterestType::Movie => "movie",
            InterestType::Cooking => "cooking",
            InterestType::Travel => "travel",
            InterestType::Study => "study",
        }
    }
}

impl FromStr for InterestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterestType::ALL
            .iter()
            .copied()
            .find(|i| i.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid interest: {}", s))
    }
}

impl fmt::Display for InterestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub provider: String,
    pub provider_user_id: String,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub region_id: Option<i64>,
    pub interests: Vec<InterestType>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller of an operation, resolved once at the request boundary.
///
/// Handlers build this from the bearer token and the user row and hand it
/// to every service call; services never look the caller up again.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub status: UserStatus,
    pub region_id: Option<i64>,
    pub interests: Vec<InterestType>,
}

impl CurrentUser {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Name used in system messages and notification texts.
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.display_name.as_deref().unwrap_or(fallback)
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            display_name: user.display_name,
            status: user.status,
            region_id: user.region_id,
            interests: user.interests,
        }
    }
}

/// An administrative region (municipality within a province).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Region {
    pub id: i64,
    pub province: String,
    pub name: String,
}

/// Request payload for completing or editing a profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub display_name: String,

    pub birthdate: NaiveDate,

    pub region_id: i64,

    #[validate(length(min = 1, max = 8, message = "Pick between 1 and 8 interests"))]
    pub interests: Vec<InterestType>,

    #[validate(custom(function = "shared::validation::validate_image_url"))]
    pub profile_image_url: Option<String>,
}

/// Profile response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub region: Option<Region>,
    pub interests: Vec<InterestType>,
    pub status: UserStatus,
}
