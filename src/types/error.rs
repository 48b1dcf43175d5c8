use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::Role;

/// Malformed caller input. Always rejected before any storage side effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid user type '{0}'")]
    InvalidRole(String),

    #[error("invalid email")]
    InvalidEmail,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("unknown flat status '{0}'")]
    UnknownStatus(String),

    #[error("invalid house: {0}")]
    InvalidHouse(String),

    #[error("invalid flat: {0}")]
    InvalidFlat(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Why a bearer token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("malformed token")]
    Malformed,
}

/// Authentication and authorization failures.
///
/// Login collapses every failure into [`AuthError::InvalidCredentials`]; the
/// authorization gate keeps missing, invalid and forbidden apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid login")]
    InvalidCredentials,

    #[error("authorization header missing")]
    MissingCredential,

    #[error("invalid token: {0}")]
    InvalidCredential(#[from] TokenError),

    #[error("insufficient permissions: {required} required")]
    InsufficientRole { required: Role, actual: Role },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(AuthError::InsufficientRole { .. }) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Validation(e) => e.to_string(),
            AppError::NotFound(msg) | AppError::Conflict(msg) | AppError::Forbidden(msg) => {
                msg.clone()
            }
            AppError::Auth(e) => e.to_string(),
            AppError::Database(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                "internal server error".to_string()
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
