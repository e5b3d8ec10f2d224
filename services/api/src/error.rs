//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;
use trip_scout_core::{PipelineError, PortError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A pipeline operation failed.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The request body was well-formed JSON but not acceptable.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded migrations could not be applied.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Pipeline(e) => {
                let status = match e {
                    PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                    PipelineError::JobNotFound | PipelineError::SessionNotFound => {
                        StatusCode::NOT_FOUND
                    }
                    PipelineError::NoAlternative => StatusCode::UNPROCESSABLE_ENTITY,
                    PipelineError::NoResults | PipelineError::Port(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.user_message())
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                trip_scout_core::error::GENERIC_FAILURE.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
