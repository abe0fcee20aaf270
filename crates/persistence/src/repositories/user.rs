//! User repository for database operations.

use chrono::NaiveDate;
use domain::models::{InterestType, UserStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{UserEntity, UserStatusDb};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, provider, provider_user_id, display_name, profile_image_url, \
     birthdate, region_id, interests, status, created_at, updated_at";

/// Profile fields written when a user completes onboarding.
#[derive(Debug, Clone)]
pub struct ProfileUpdate<'a> {
    pub display_name: &'a str,
    pub birthdate: NaiveDate,
    pub region_id: i64,
    pub interests: &'a [InterestType],
    pub profile_image_url: Option<&'a str>,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns the user for an identity-provider account, creating an
    /// INCOMPLETE user on first sight.
    pub async fn find_or_create_by_provider(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("find_or_create_user_by_provider");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (provider, provider_user_id)
            VALUES ($1, $2)
            ON CONFLICT (provider, provider_user_id)
            DO UPDATE SET updated_at = users.updated_at
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(provider)
        .bind(provider_user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Writes the profile and activates the user.
    pub async fn update_profile(
        &self,
        id: Uuid,
        profile: ProfileUpdate<'_>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let interests: Vec<&str> = profile.interests.iter().map(|i| i.as_str()).collect();
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET display_name = $2,
                birthdate = $3,
                region_id = $4,
                interests = $5,
                profile_image_url = $6,
                status = $7,
                updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(profile.display_name)
        .bind(profile.birthdate)
        .bind(profile.region_id)
        .bind(&interests)
        .bind(profile.profile_image_url)
        .bind(UserStatusDb::from(UserStatus::Active))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
