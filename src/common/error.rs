//! Unified error handling
//!
//! Every failure path maps to a machine-readable code plus an HTTP status:
//!
//! | Code | HTTP |
//! |------|------|
//! | NO_AUTH_HEADER / INVALID_TOKEN_FORMAT / TOKEN_EXPIRED / INVALID_TOKEN / INVALID_TOKEN_PAYLOAD / NOT_AUTHENTICATED | 401 |
//! | INVALID_CREDENTIALS | 400 |
//! | INSUFFICIENT_PERMISSIONS | 403 |
//! | NOT_FOUND | 404 |
//! | DUPLICATE | 409 |
//! | VALIDATION_FAILED / INVALID_REQUEST | 400 |
//! | BUSINESS_RULE | 422 |
//! | DATABASE_ERROR / INTERNAL_ERROR | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// Error response body
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Invoice invoice:abc not found"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors (401) ==========
    #[error("Authorization header missing")]
    NoAuthHeader,

    #[error("Authorization header is not a bearer token")]
    InvalidTokenFormat,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token payload is malformed")]
    InvalidTokenPayload,

    #[error("Not authenticated")]
    NotAuthenticated,

    // ========== Authorization errors (403) ==========
    #[error("Insufficient permissions: {0}")]
    Forbidden(String),

    // ========== Business errors (4xx) ==========
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::NoAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "NO_AUTH_HEADER",
                "Authorization header missing".to_string(),
                None,
            ),
            AppError::InvalidTokenFormat => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN_FORMAT",
                "Authorization header must be 'Bearer <token>'".to_string(),
                None,
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token has expired".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Token is invalid".to_string(),
                None,
            ),
            AppError::InvalidTokenPayload => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN_PAYLOAD",
                "Token payload is malformed".to_string(),
                None,
            ),
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "Authentication required".to_string(),
                None,
            ),
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, "INSUFFICIENT_PERMISSIONS", msg, None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "DUPLICATE", msg, None),
            AppError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message, details)
            }
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "BUSINESS_RULE", msg, None)
            }
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg, None),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
                None,
            ),
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorBody {
            code: code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            details: None,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&e).ok();
        AppError::Validation {
            message: "Request validation failed".to_string(),
            details,
        }
    }
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;
