//! API error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Employee not found")]
    NotFound,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded. Maximum {max_requests} requests per {} allowed.", window_label(.window))]
    RateLimited {
        max_requests: usize,
        window: Duration,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

// "minute" for the common 60s window, otherwise "N seconds"
fn window_label(window: &Duration) -> String {
    match window.as_secs() {
        60 => "minute".to_string(),
        1 => "second".to_string(),
        secs => format!("{} seconds", secs),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // storage details stay in the log
        let detail = match &self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database query failed");
                "Internal server error".to_string()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
