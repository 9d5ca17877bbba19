//! Application error types
//!
//! Authentication and infrastructure failures shared by every layer above the
//! domain. Domain errors are wrapped and keep their own message and code.

use std::fmt;

use screen_core::DomainError;
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Authentication credentials were not provided")]
    MissingAuth,

    // Validation errors
    #[error("{0}")]
    Validation(String),

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Get HTTP status code for this error
    ///
    /// Business-rule and conflict failures are client errors (400), access
    /// denial is 403 and only unexpected failures reach 500.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired | Self::MissingAuth => {
                401
            }
            Self::NotFound(_) => 404,
            Self::Database(_) | Self::Internal(_) => 500,
            Self::Domain(e) => domain_status(e),
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MissingAuth => "MISSING_AUTH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// HTTP status for a domain error
#[must_use]
pub fn domain_status(e: &DomainError) -> u16 {
    if e.is_not_found() {
        404
    } else if e.is_authorization() {
        403
    } else if e.is_validation() || e.is_conflict() || e.is_business_rule() {
        400
    } else {
        500
    }
}

/// JSON body of every error response: `{"error": "...", "code": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        // Never leak internal details
        let message = if err.is_server_error() {
            "Internal server error".to_string()
        } else {
            err.to_string()
        };
        Self::new(message, err.error_code())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidCredentials.status_code(), 401);
        assert_eq!(AppError::MissingAuth.status_code(), 401);
        assert_eq!(AppError::not_found("Profile").status_code(), 404);
        assert_eq!(AppError::validation("bad").status_code(), 400);
        assert_eq!(AppError::Database("down".to_string()).status_code(), 500);
    }

    #[test]
    fn test_domain_status_normalization() {
        assert_eq!(AppError::from(DomainError::CompetitionNotFound).status_code(), 404);
        assert_eq!(AppError::from(DomainError::NoCompetitionAccess).status_code(), 403);
        assert_eq!(AppError::from(DomainError::NotCompetitionCreator).status_code(), 403);
        assert_eq!(AppError::from(DomainError::AlreadyInvited).status_code(), 400);
        assert_eq!(AppError::from(DomainError::CreatorCannotLeave).status_code(), 400);
        assert_eq!(AppError::from(DomainError::InvalidDateRange).status_code(), 400);
        assert_eq!(
            AppError::from(DomainError::DatabaseError("x".to_string())).status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(AppError::from(DomainError::NotFriends).error_code(), "NOT_FRIENDS");
    }

    #[test]
    fn test_error_response_body() {
        let body = ErrorResponse::from(&AppError::from(DomainError::NotFriends));
        assert_eq!(body.error, "You can only invite friends to competitions");
        assert_eq!(body.code, "NOT_FRIENDS");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "You can only invite friends to competitions");
    }

    #[test]
    fn test_server_errors_are_masked() {
        let body = ErrorResponse::from(&AppError::Database("password=hunter2".to_string()));
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.code, "DATABASE_ERROR");
    }
}
