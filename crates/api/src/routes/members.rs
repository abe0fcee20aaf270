//! Membership routes: applications, decisions, leaving and kicking.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::group::{ApplicationResponse, MembershipResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// Apply to join a group. The owner is notified.
///
/// POST /api/v1/groups/:group_id/join
pub async fn request_to_join(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
) -> Result<(StatusCode, Json<MembershipResponse>), ApiError> {
    let membership = state.membership().request_to_join(&actor, group_id).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// Pending applications of a group, for its owner.
///
/// GET /api/v1/groups/:group_id/applications
pub async fn list_applications(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    Ok(Json(
        state.membership().list_applications(&actor, group_id).await?,
    ))
}

/// POST /api/v1/group-members/:member_id/approve
pub async fn approve_member(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MembershipResponse>, ApiError> {
    Ok(Json(state.membership().approve(&actor, member_id).await?))
}

/// POST /api/v1/group-members/:member_id/reject
pub async fn reject_member(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MembershipResponse>, ApiError> {
    Ok(Json(state.membership().reject(&actor, member_id).await?))
}

/// Leave a group. Owners cannot leave their own group.
///
/// DELETE /api/v1/groups/:group_id/members/me
pub async fn leave_group(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.membership().leave(&actor, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a member from a group. Owner only.
///
/// DELETE /api/v1/groups/:group_id/members/:user_id
pub async fn kick_member(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.membership().kick(&actor, group_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
