use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::images::ImageStoreError;

#[derive(Debug, Error)]
pub enum GoodError {
    #[error("Good not found: {0}")]
    NotFound(Uuid),

    #[error("No goods in category {0}")]
    EmptyCategory(Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Malformed form: {0}")]
    Form(#[from] MultipartError),

    #[error("Image deletion failed: {0}")]
    ImageDeleteFailed(String),

    #[error("Image upload failed: {0}")]
    ImageUpload(String),

    /// Any failure while updating, carrying the underlying cause.
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type GoodResult<T> = Result<T, GoodError>;

impl From<ImageStoreError> for GoodError {
    fn from(err: ImageStoreError) -> Self {
        GoodError::ImageUpload(err.to_string())
    }
}

impl From<GoodError> for AppError {
    fn from(err: GoodError) -> Self {
        match err {
            GoodError::NotFound(_) => AppError::NotFound("Good not found".to_string()),
            GoodError::EmptyCategory(_) => {
                AppError::NotFound("No goods found in this category".to_string())
            }
            GoodError::InvalidInput(msg) => AppError::BadRequest(msg),
            GoodError::Validation(errors) => AppError::ValidationError(errors),
            GoodError::Form(e) => AppError::Multipart(e),
            GoodError::ImageDeleteFailed(detail) => AppError::detailed(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::StorageError,
                "Image deletion failed",
                json!({ "error": detail }),
            ),
            GoodError::UpdateFailed(detail) => AppError::detailed(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ProcessingFailed,
                ErrorCode::ProcessingFailed.default_message(),
                json!({ "error": detail }),
            ),
            GoodError::ImageUpload(msg) => AppError::Storage(msg),
            GoodError::Database(msg) | GoodError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for GoodError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
