use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::{ApiResponse, FieldErrors};
use crate::services::{AuthError, CatalogError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    /// Field-by-field rejection of a submitted body.
    InvalidFields(FieldErrors),

    Unauthorized(String),

    /// Image upload or record write failed while saving a product.
    SaveFailed(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InvalidFields(fields) => {
                write!(f, "Validation error: {} invalid field(s)", fields.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiResponse::<()>::error(msg)),
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, ApiResponse::<()>::error(msg))
            }
            ApiError::InvalidFields(fields) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::invalid("Validation failed", fields),
            ),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiResponse::<()>::error(msg))
            }
            ApiError::SaveFailed(msg) => {
                tracing::error!("Failed to save product: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error("Failed to save product"),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error("An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::not_found("Product", id),
            CatalogError::Storage(e) => Self::SaveFailed(e.to_string()),
            CatalogError::Store(e) => Self::internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Store(e) => Self::internal(e.to_string()),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }

    /// Maps a catalog write failure. Store errors during a save report the
    /// same generic message as upload failures.
    pub fn from_save(err: CatalogError) -> Self {
        match err {
            CatalogError::Store(e) => Self::SaveFailed(e.to_string()),
            other => other.into(),
        }
    }
}
