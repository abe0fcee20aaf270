//! Group board routes: posts and threaded comments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::board::{
    CreateCommentRequest, ListCommentsResponse, ListPostsQuery, ListPostsResponse, PostRequest,
    UpdateCommentRequest,
};
use domain::models::{Comment, Post};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// POST /api/v1/groups/:group_id/posts
pub async fn create_post(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
    Json(request): Json<PostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    request.validate()?;

    let post = state.board().create_post(&actor, group_id, &request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Newest posts first; pass `next_before` back as `before` for the next page.
///
/// GET /api/v1/groups/:group_id/posts?before=&limit=
pub async fn list_posts(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<ListPostsResponse>, ApiError> {
    Ok(Json(state.board().list_posts(&actor, group_id, &query).await?))
}

/// GET /api/v1/posts/:post_id
pub async fn get_post(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(post_id): Path<i64>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.board().get_post(&actor, post_id).await?))
}

/// PUT /api/v1/posts/:post_id
pub async fn update_post(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(post_id): Path<i64>,
    Json(request): Json<PostRequest>,
) -> Result<Json<Post>, ApiError> {
    request.validate()?;
    Ok(Json(state.board().update_post(&actor, post_id, &request).await?))
}

/// DELETE /api/v1/posts/:post_id
pub async fn delete_post(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.board().delete_post(&actor, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/posts/:post_id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(post_id): Path<i64>,
) -> Result<Json<ListCommentsResponse>, ApiError> {
    Ok(Json(state.board().list_comments(&actor, post_id).await?))
}

/// POST /api/v1/posts/:post_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(post_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    request.validate()?;

    let comment = state
        .board()
        .create_comment(&actor, post_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/v1/comments/:comment_id
pub async fn update_comment(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(comment_id): Path<i64>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    request.validate()?;
    Ok(Json(
        state
            .board()
            .update_comment(&actor, comment_id, &request)
            .await?,
    ))
}

/// DELETE /api/v1/comments/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(comment_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.board().delete_comment(&actor, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
