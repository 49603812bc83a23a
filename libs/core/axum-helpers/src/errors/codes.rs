//! Type-safe error codes for API responses.
//!
//! Each code carries a string identifier for clients, an integer for logs and
//! metrics, and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    ValidationError,
    InvalidUuid,
    InvalidMultipart,
    NotFound,
    BadRequest,
    PayloadTooLarge,

    // Server errors
    InternalError,
    /// A write failed part way; the message explains what was being done
    ProcessingFailed,

    // Storage errors (4000-4999)
    StorageError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier clients can branch on.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::InvalidMultipart => "INVALID_MULTIPART",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ProcessingFailed => "PROCESSING_FAILED",
            Self::StorageError => "STORAGE_ERROR",
        }
    }

    /// Integer code for structured logs.
    ///
    /// - 1000-1999: client and generic server errors
    /// - 4000-4999: file storage errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::InvalidMultipart => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::BadRequest => 1006,
            Self::PayloadTooLarge => 1007,
            Self::ProcessingFailed => 1012,
            Self::StorageError => 4002,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::InvalidMultipart => "Malformed multipart form",
            Self::NotFound => "Resource not found",
            Self::BadRequest => "Bad request",
            Self::PayloadTooLarge => "Request body is too large",
            Self::InternalError => "An internal server error occurred",
            Self::ProcessingFailed => "An error occurred while processing the request",
            Self::StorageError => "File storage operation failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::ProcessingFailed.as_str(), "PROCESSING_FAILED");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::InvalidUuid.code(), 1002);
        assert_eq!(ErrorCode::StorageError.code(), 4002);
    }

    #[test]
    fn test_error_code_display_matches_serde() {
        let code = ErrorCode::InvalidMultipart;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, format!("\"{}\"", code));
    }

    #[test]
    fn test_error_code_deserialization() {
        let code: ErrorCode = serde_json::from_str("\"STORAGE_ERROR\"").unwrap();
        assert_eq!(code, ErrorCode::StorageError);
    }
}
