//! crates/trip_scout_core/src/error.rs

use crate::ports::PortError;

pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again.";
pub const NO_RESULTS: &str = "No recommendations could be generated. Please try again.";
pub const SESSION_EXPIRED: &str =
    "Session expired. Please click Start Over to generate a new guide.";
pub const NO_ALTERNATIVE: &str =
    "Could not find an alternative. Try again or toggle this item off.";

/// Errors surfaced by the pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Job not found")]
    JobNotFound,
    #[error("Session not found")]
    SessionNotFound,
    #[error("No alternative could be generated")]
    NoAlternative,
    #[error("Every section came back empty")]
    NoResults,
    #[error(transparent)]
    Port(#[from] PortError),
}

impl PipelineError {
    /// Text safe to show the caller. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::InvalidRequest(reason) => reason.clone(),
            PipelineError::JobNotFound => "Job not found".to_string(),
            PipelineError::SessionNotFound => SESSION_EXPIRED.to_string(),
            PipelineError::NoAlternative => NO_ALTERNATIVE.to_string(),
            PipelineError::NoResults => NO_RESULTS.to_string(),
            PipelineError::Port(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

pub type PipelineResultOf<T> = Result<T, PipelineError>;
