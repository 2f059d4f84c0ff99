//! HTTP error mapping for envmond routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use envmon_common::{InvalidMetricType, QueryError, ReadingError, StoreError};
use serde_json::json;
use tracing::error;

/// Errors surfaced to API clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidMetric(#[from] InvalidMetricType),

    #[error("invalid reading: {0}")]
    InvalidReading(#[from] ReadingError),

    #[error("{0}")]
    BadRequest(String),

    #[error("failed to access readings: {0}")]
    Storage(#[from] StoreError),

    #[error("internal error: {0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidMetric(_) | ApiError::InvalidReading(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Storage(_) | ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidMetricType(e) => ApiError::InvalidMetric(e),
            QueryError::StorageUnavailable(e) => ApiError::Storage(e),
            QueryError::UnexpectedFailure(msg) => ApiError::Unexpected(msg),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Unexpected(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("  Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let invalid: ApiError = QueryError::InvalidMetricType(InvalidMetricType("x".into())).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "invalid metric type: x");

        let unexpected: ApiError = QueryError::UnexpectedFailure("boom".into()).into();
        assert_eq!(unexpected.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let storage: ApiError = StoreError::NotConfigured.into();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
