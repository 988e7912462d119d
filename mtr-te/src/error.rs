//! Error types for mtr-te HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::ExploreError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Engine error, status chosen per variant
    #[error(transparent)]
    Explore(#[from] ExploreError),
}

fn common_status(err: &mtr_common::Error) -> (StatusCode, &'static str) {
    match err {
        mtr_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        mtr_common::Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
    }
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Explore(err) => match err {
                ExploreError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
                ExploreError::InsufficientCandidates { .. } => {
                    (StatusCode::CONFLICT, "INSUFFICIENT_CANDIDATES")
                }
                ExploreError::InvalidComparison(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_COMPARISON")
                }
                ExploreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ExploreError::Store(err) => common_status(err),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
