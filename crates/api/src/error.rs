//! Error types for the analytics API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use analytics::AnalyticsError;
use database::DatabaseError;

/// Errors that can occur while serving an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database error.
    #[error("{0}")]
    Database(#[from] DatabaseError),

    /// Analytics engine error.
    #[error("{0}")]
    Analytics(#[from] AnalyticsError),

    /// Malformed request parameter.
    #[error("{0}")]
    BadRequest(String),
}

fn database_status(err: &DatabaseError) -> StatusCode {
    match err {
        DatabaseError::NotFound { .. } | DatabaseError::ForeignKey { .. } => StatusCode::NOT_FOUND,
        DatabaseError::AlreadyExists { .. } => StatusCode::CONFLICT,
        DatabaseError::Sqlx(_) | DatabaseError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(err) => database_status(err),
            ApiError::Analytics(err) => match err {
                AnalyticsError::Database(db) => database_status(db),
                AnalyticsError::MissingField(_)
                | AnalyticsError::InsufficientHistory
                | AnalyticsError::DateNotFound(_)
                | AnalyticsError::ModelNotTrained(_) => StatusCode::BAD_REQUEST,
                AnalyticsError::MalformedDate(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
