//! User JWT authentication extractors.
//!
//! `UserAuth` resolves the bearer token to a user id. `Caller` goes one step
//! further and loads the user row into a [`CurrentUser`] that handlers pass
//! to every service call. A token for a deleted account resolves but is
//! refused by `Caller`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use domain::models::{CurrentUser, User, UserStatus};
use persistence::repositories::UserRepository;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user id from the access token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Reads the token from `Authorization: Bearer ...`, falling back to a
/// `token` query parameter for WebSocket upgrades from browsers.
async fn extract_token(parts: &mut Parts, state: &AppState) -> Result<String, ApiError> {
    if let Some(header) = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
    {
        return header
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".into()));
    }

    let Query(query) = Query::<TokenQuery>::from_request_parts(parts, state)
        .await
        .map_err(|_| ApiError::Unauthorized("Missing Authorization header".into()))?;

    query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts, state).await?;
        let user_id = state.jwt.resolve_user_id(&token)?;
        Ok(UserAuth { user_id })
    }
}

/// The authenticated caller with their profile loaded.
#[derive(Debug, Clone)]
pub struct Caller(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = UserAuth::from_request_parts(parts, state).await?;

        let user: User = UserRepository::new(state.pool.clone())
            .find_by_id(auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".into()))?
            .into();

        if user.status == UserStatus::Deleted {
            return Err(ApiError::Unauthorized("Account has been deleted".into()));
        }

        tracing::Span::current().record("user_id", tracing::field::display(user.id));
        Ok(Caller(user.into()))
    }
}
