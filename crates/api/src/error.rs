use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::MembershipError;
use persistence::error::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A membership rule was violated; the reason code is sent as `error`.
    #[error("{0}")]
    Membership(MembershipError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// One failed field of a request body.
struct ValidationDetail {
    field: String,
    message: String,
}

fn membership_status(err: &MembershipError) -> StatusCode {
    match err {
        MembershipError::NotOwner
        | MembershipError::OwnerCannotLeave
        | MembershipError::CannotKickSelf
        | MembershipError::OwnerMembershipLocked
        | MembershipError::NotMember
        | MembershipError::NotAuthor
        | MembershipError::UserNotActive => StatusCode::FORBIDDEN,
        MembershipError::GroupNotFound
        | MembershipError::MemberNotFound
        | MembershipError::UserNotFound
        | MembershipError::RegionNotFound
        | MembershipError::ChatRoomNotFound
        | MembershipError::PostNotFound
        | MembershipError::CommentNotFound => StatusCode::NOT_FOUND,
        MembershipError::AlreadyMember
        | MembershipError::GroupFull
        | MembershipError::DuplicateChatRoom => StatusCode::CONFLICT,
        MembershipError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Membership(err) => (membership_status(err), err.code(), err.to_string()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        ApiError::Membership(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rule(rule) => ApiError::Membership(rule),
            StoreError::Database(db) => db.into(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        "23514" => ApiError::Validation("Value violates a constraint".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                })
            })
            .collect();

        // Nested struct or list errors carry no field entry
        if details.is_empty() {
            details.push(ValidationDetail {
                field: "__all__".to_string(),
                message: errors.to_string(),
            });
        }

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
            format!("{} validation errors: {}", details.len(), fields.join(", "))
        };

        ApiError::Validation(message)
    }
}

impl From<shared::jwt::JwtError> for ApiError {
    fn from(err: shared::jwt::JwtError) -> Self {
        match err {
            shared::jwt::JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".into()),
            shared::jwt::JwtError::InvalidKey(msg) => ApiError::Internal(msg),
            _ => ApiError::Unauthorized("Invalid or expired token".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_unauthorized() {
        let response = ApiError::Unauthorized("test message".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_api_error_validation() {
        let response = ApiError::Validation("invalid input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_internal() {
        let response = ApiError::Internal("database connection failed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_membership_authorization_errors_are_forbidden() {
        for err in [
            MembershipError::NotOwner,
            MembershipError::OwnerCannotLeave,
            MembershipError::CannotKickSelf,
            MembershipError::OwnerMembershipLocked,
            MembershipError::NotMember,
            MembershipError::NotAuthor,
            MembershipError::UserNotActive,
        ] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn test_membership_not_found_errors() {
        for err in [
            MembershipError::GroupNotFound,
            MembershipError::MemberNotFound,
            MembershipError::UserNotFound,
            MembershipError::RegionNotFound,
            MembershipError::ChatRoomNotFound,
            MembershipError::PostNotFound,
            MembershipError::CommentNotFound,
        ] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_membership_conflicts() {
        for err in [
            MembershipError::AlreadyMember,
            MembershipError::GroupFull,
            MembershipError::DuplicateChatRoom,
        ] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }

    #[tokio::test]
    async fn test_membership_error_body_carries_reason_code() {
        let response = ApiError::from(MembershipError::GroupFull).into_response();
        let body = body_json(response).await;

        assert_eq!(body["error"], "group_full");
        assert_eq!(body["message"], "Group has reached its maximum member count");
    }

    #[test]
    fn test_store_error_conversion() {
        let error: ApiError = StoreError::Rule(MembershipError::AlreadyMember).into();
        assert!(matches!(
            error,
            ApiError::Membership(MembershipError::AlreadyMember)
        ));

        let error: ApiError = StoreError::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_from_jwt_error() {
        let error: ApiError = shared::jwt::JwtError::TokenExpired.into();
        assert!(matches!(error, ApiError::Unauthorized(_)));

        let error: ApiError = shared::jwt::JwtError::InvalidKey("bad pem".into()).into();
        assert!(matches!(error, ApiError::Internal(_)));
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::Conflict("test".to_string())),
            "Conflict: test"
        );
        assert_eq!(
            format!("{}", ApiError::Membership(MembershipError::NotOwner)),
            "Only the group owner can do this"
        );
    }
}
