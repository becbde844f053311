//! Error types for tractkit-agg
//!
//! Component errors (resolution, survey fetches, health tables) are absorbed
//! close to where they occur. Only request-shape problems, an empty batch and
//! encoder failures reach the client as [`ApiError`].

use crate::export::ExportError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Addresses were supplied but none could be processed (400)
    #[error("{0}")]
    BatchEmpty(String),

    /// Table encoding failed (500)
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::BatchEmpty(msg) => (StatusCode::BAD_REQUEST, "BATCH_EMPTY", msg),
            ApiError::Export(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXPORT_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::BatchEmpty("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Export(ExportError::TooManyColumns(20_000)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_batch_empty_message_is_bare() {
        let err = ApiError::BatchEmpty("No valid addresses processed.".into());
        assert_eq!(err.to_string(), "No valid addresses processed.");
    }
}
