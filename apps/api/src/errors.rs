use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::failure;

/// Message shown for every infrastructure failure.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => failure(StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => failure(StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(reason) => {
                tracing::debug!("Rejected request: {reason}");
                failure(StatusCode::UNAUTHORIZED, "Unauthenticated")
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                failure(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                failure(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
            }
        }
    }
}
