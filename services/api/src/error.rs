//! Custom error types for the LearnPro API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the LearnPro API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// A referenced user, course, or quiz does not exist
    #[error("{0}")]
    NotFound(String),

    /// A unique constraint would be violated (duplicate email, duplicate
    /// enrollment)
    #[error("{0}")]
    AlreadyExists(String),

    /// Missing or malformed input
    #[error("{0}")]
    InvalidInput(String),

    /// Role-gated operation attempted by an insufficient role
    #[error("Unauthorized")]
    Unauthorized,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(common::error::DatabaseError::Query(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized".to_string()),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (
                ApiError::NotFound("Course not found".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::AlreadyExists("Already enrolled in this course".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::InvalidInput("minPrice must be a number".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Unauthorized, StatusCode::FORBIDDEN),
            (
                ApiError::InternalServerError,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
