//! Group routes: create, browse, edit and delete meetup groups.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::group::{
    CreateGroupRequest, GroupDetail, ListGroupsQuery, ListGroupsResponse, UpdateGroupRequest,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// Create a group. The caller becomes its owner and first member, and the
/// group's chat room is opened in the same transaction.
///
/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupDetail>), ApiError> {
    request.validate()?;

    let detail = state.membership().create_group(&actor, &request).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// List groups, optionally filtered by interest and/or region.
///
/// GET /api/v1/groups?interest=&region_id=
pub async fn list_groups(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Query(query): Query<ListGroupsQuery>,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let data = state.membership().list_groups(&query).await?;
    let count = data.len();

    info!(
        user_id = %actor.user_id,
        interest = ?query.interest,
        region_id = ?query.region_id,
        group_count = count,
        "Listed groups"
    );

    Ok(Json(ListGroupsResponse { data, count }))
}

/// Groups the caller is an approved member of.
///
/// GET /api/v1/groups/me
pub async fn my_groups(
    State(state): State<AppState>,
    Caller(actor): Caller,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let data = state.membership().my_groups(&actor).await?;
    let count = data.len();
    Ok(Json(ListGroupsResponse { data, count }))
}

/// Groups matching the caller's interests or region that they have not
/// applied to yet.
///
/// GET /api/v1/groups/recommended
pub async fn recommended_groups(
    State(state): State<AppState>,
    Caller(actor): Caller,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let data = state.membership().recommended_groups(&actor).await?;
    let count = data.len();
    Ok(Json(ListGroupsResponse { data, count }))
}

/// GET /api/v1/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    Caller(_actor): Caller,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetail>, ApiError> {
    Ok(Json(state.membership().group_details(group_id).await?))
}

/// Owner only.
///
/// PUT /api/v1/groups/:group_id
pub async fn update_group(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<GroupDetail>, ApiError> {
    request.validate()?;

    let detail = state
        .membership()
        .update_group(&actor, group_id, &request)
        .await?;
    Ok(Json(detail))
}

/// Owner only. Members, chat room and messages go with the group.
///
/// DELETE /api/v1/groups/:group_id
pub async fn delete_group(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.membership().delete_group(&actor, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
