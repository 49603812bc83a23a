//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Parses the single path parameter as a UUID, answering 400 with the
/// standard error body when it isn't one.
///
/// ```ignore
/// async fn get_good(UuidPath(id): UuidPath) -> String {
///     format!("Good ID: {}", id)
/// }
///
/// let app = Router::new().route("/goods/{id}", get(get_good));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Uuid::parse_str(&raw)
            .map(UuidPath)
            .map_err(|_| AppError::InvalidUuid(raw).into_response())
    }
}
