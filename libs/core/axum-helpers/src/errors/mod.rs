pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Good not found",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details such as field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details,
        }
    }
}

/// Application error type that converts into an HTTP response.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    /// A path or query value that should have been a UUID; holds the raw text.
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Multipart rejection: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    /// Fully specified error for cases the variants above don't describe,
    /// e.g. a failed update that reports the underlying cause in `details`.
    #[error("{message}")]
    Detailed {
        status: StatusCode,
        code: ErrorCode,
        message: String,
        details: Value,
    },
}

impl AppError {
    pub fn detailed(
        status: StatusCode,
        code: ErrorCode,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self::Detailed {
            status,
            code,
            message: message.into(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {:?}",
                    e
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message().to_string(),
                    serde_json::to_value(&e).ok(),
                )
            }
            AppError::InvalidUuid(raw) => {
                tracing::info!(error_code = ErrorCode::InvalidUuid.code(), "Invalid UUID: {}", raw);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidUuid,
                    format!("Invalid UUID: {}", raw),
                    None,
                )
            }
            AppError::Multipart(e) => multipart_parts(e.status(), e.body_text()),
            AppError::MultipartRejection(e) => multipart_parts(e.status(), e.body_text()),
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg, None)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None)
            }
            AppError::Storage(msg) => {
                tracing::error!(
                    error_code = ErrorCode::StorageError.code(),
                    "Storage error: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StorageError,
                    ErrorCode::StorageError.default_message().to_string(),
                    None,
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                    None,
                )
            }
            AppError::Detailed {
                status,
                code,
                message,
                details,
            } => {
                if status.is_server_error() {
                    tracing::error!(error_code = code.code(), %details, "{}", message);
                } else {
                    tracing::info!(error_code = code.code(), %details, "{}", message);
                }
                (status, code, message, Some(details))
            }
        };

        (status, Json(ErrorResponse::new(code, message, details))).into_response()
    }
}

fn multipart_parts(
    status: StatusCode,
    body_text: String,
) -> (StatusCode, ErrorCode, String, Option<Value>) {
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorCode::PayloadTooLarge
    } else {
        ErrorCode::InvalidMultipart
    };
    tracing::info!(error_code = code.code(), "Multipart error: {}", body_text);
    (status, code, body_text, None)
}

/// Builds a bare error response without going through [`AppError`].
pub fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(code, message, None))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_uses_message() {
        let response = AppError::NotFound("Good not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], 1004);
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Good not found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response =
            AppError::InternalServerError("connection reset by peer".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_detailed_error_carries_details() {
        let response = AppError::detailed(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ProcessingFailed,
            "An error occurred while processing the request",
            json!({ "error": "disk full" }),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "PROCESSING_FAILED");
        assert_eq!(body["details"]["error"], "disk full");
    }

    #[tokio::test]
    async fn test_invalid_uuid_echoes_value() {
        let response = AppError::InvalidUuid("not-a-uuid".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], 1002);
        assert_eq!(body["error"], "INVALID_UUID");
        assert_eq!(body["message"], "Invalid UUID: not-a-uuid");
    }

    #[tokio::test]
    async fn test_error_response_helper() {
        let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, "nope");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], 1006);
        assert_eq!(body["message"], "nope");
    }
}
