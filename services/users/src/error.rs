//! Custom error types for the users service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// Custom error type for the users service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or unparseable body or identity
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No user with the requested identity
    #[error("Not found")]
    NotFound,

    /// Body parsed but broke field rules
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// None of the accepted media types can be produced
    #[error("Not acceptable")]
    NotAcceptable,

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // No representation at all, not even an empty JSON document
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE.into_response(),
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": msg,
                })),
            )
                .into_response(),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                })),
            )
                .into_response(),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
