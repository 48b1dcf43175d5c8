//! API request handlers.
//!
//! Extractor rejections are funnelled into [`AppError`] so malformed input
//! gets the same `{"error": ...}` body as every other failure.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};

use crate::types::{AppError, ValidationError};

/// Registration, login and dummy login.
pub mod auth;
/// Flat creation and moderation.
pub mod flats;
/// House creation and flat listing.
pub mod houses;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::InvalidRequest(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        ValidationError::InvalidRequest(rejection.body_text()).into()
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        ValidationError::InvalidRequest(rejection.body_text()).into()
    }
}
