//! Profile routes.

use axum::{extract::State, Json};
use domain::models::user::{UpdateProfileRequest, UserProfile};
use domain::models::{Region, User};
use domain::services::MembershipError;
use persistence::repositories::{ProfileUpdate, RegionRepository, UserRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

async fn to_profile(state: &AppState, user: User) -> Result<UserProfile, ApiError> {
    let region: Option<Region> = match user.region_id {
        Some(id) => RegionRepository::new(state.pool.clone())
            .find_by_id(id)
            .await?
            .map(Into::into),
        None => None,
    };

    Ok(UserProfile {
        id: user.id,
        display_name: user.display_name,
        profile_image_url: user.profile_image_url,
        birthdate: user.birthdate,
        region,
        interests: user.interests,
        status: user.status,
    })
}

/// Get the caller's profile.
///
/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<UserProfile>, ApiError> {
    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(caller.user_id)
        .await?
        .ok_or(ApiError::Membership(MembershipError::UserNotFound))?
        .into();

    Ok(Json(to_profile(&state, user).await?))
}

/// Complete or edit the caller's profile. A completed profile activates
/// the account.
///
/// PUT /api/v1/users/me/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate()?;

    if RegionRepository::new(state.pool.clone())
        .find_by_id(request.region_id)
        .await?
        .is_none()
    {
        return Err(MembershipError::RegionNotFound.into());
    }

    let update = ProfileUpdate {
        display_name: request.display_name.trim(),
        birthdate: request.birthdate,
        region_id: request.region_id,
        interests: &request.interests,
        profile_image_url: request.profile_image_url.as_deref(),
    };

    let user: User = UserRepository::new(state.pool.clone())
        .update_profile(caller.user_id, update)
        .await?
        .ok_or(ApiError::Membership(MembershipError::UserNotFound))?
        .into();

    info!(user_id = %user.id, status = %user.status.as_str(), "Profile updated");

    Ok(Json(to_profile(&state, user).await?))
}
