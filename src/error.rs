/// Unified error types for GameVault
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum VaultError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization errors
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic conflict errors (e.g. duplicate username or slug)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A shared account is already leased by another user
    #[error("Account is currently in use")]
    AccountInUse {
        holder: String,
        seconds_remaining: i64,
    },

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(String),
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<i64>,
}

/// Convert VaultError to HTTP response
impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        let (status, error_code, message, holder, seconds_remaining) = match self {
            VaultError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
                None,
                None,
            ),
            VaultError::Authorization(_) => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                self.to_string(),
                None,
                None,
            ),
            VaultError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
                None,
                None,
            ),
            VaultError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                self.to_string(),
                None,
                None,
            ),
            VaultError::Conflict(_) => (
                StatusCode::CONFLICT,
                "Conflict",
                self.to_string(),
                None,
                None,
            ),
            VaultError::AccountInUse {
                holder,
                seconds_remaining,
            } => (
                StatusCode::CONFLICT,
                "AccountInUse",
                "Account is currently in use".to_string(),
                Some(holder),
                Some(seconds_remaining),
            ),
            VaultError::Database(_) | VaultError::Internal(_) | VaultError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
                None,
                None,
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                self.to_string(),
                None,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            holder,
            seconds_remaining,
        });

        (status, body).into_response()
    }
}

/// Result type alias for server operations
pub type VaultResult<T> = Result<T, VaultError>;
