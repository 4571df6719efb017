//! Extractors whose rejections use the standard failure envelope.

use axum::extract::{rejection::PathRejection, FromRequestParts};

use crate::errors::AppError;

/// `axum::extract::Path` that rejects with `AppError::Validation` (400).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
