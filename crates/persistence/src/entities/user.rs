//! User and region entities (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{InterestType, UserStatus};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database enum for user_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
pub enum UserStatusDb {
    Incomplete,
    Active,
    Deleted,
}

impl From<UserStatusDb> for UserStatus {
    fn from(db_status: UserStatusDb) -> Self {
        match db_status {
            UserStatusDb::Incomplete => UserStatus::Incomplete,
            UserStatusDb::Active => UserStatus::Active,
            UserStatusDb::Deleted => UserStatus::Deleted,
        }
    }
}

impl From<UserStatus> for UserStatusDb {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Incomplete => UserStatusDb::Incomplete,
            UserStatus::Active => UserStatusDb::Active,
            UserStatus::Deleted => UserStatusDb::Deleted,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub provider: String,
    pub provider_user_id: String,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub region_id: Option<i64>,
    pub interests: Vec<String>,
    pub status: UserStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            provider: entity.provider,
            provider_user_id: entity.provider_user_id,
            display_name: entity.display_name,
            profile_image_url: entity.profile_image_url,
            birthdate: entity.birthdate,
            region_id: entity.region_id,
            // Unknown tags are skipped rather than failing the whole row
            interests: entity
                .interests
                .iter()
                .filter_map(|i| InterestType::from_str(i).ok())
                .collect(),
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the regions table.
#[derive(Debug, Clone, FromRow)]
pub struct RegionEntity {
    pub id: i64,
    pub province: String,
    pub name: String,
}

impl From<RegionEntity> for domain::models::Region {
    fn from(entity: RegionEntity) -> Self {
        Self {
            id: entity.id,
            province: entity.province,
            name: entity.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_entity_conversion_parses_interests() {
        let entity = UserEntity {
            id: Uuid::new_v4(),
            provider: "kakao".to_string(),
            provider_user_id: "42".to_string(),
            display_name: Some("Mina".to_string()),
            profile_image_url: None,
            birthdate: None,
            region_id: Some(3),
            interests: vec!["music".to_string(), "unknown".to_string(), "study".to_string()],
            status: UserStatusDb::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let user: domain::models::User = entity.into();
        assert_eq!(
            user.interests,
            vec![InterestType::Music, InterestType::Study]
        );
        assert_eq!(user.status, UserStatus::Active);
    }
}
