pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

pub use rest::{
    finalize_handler, generate_handler, health_handler, poll_job_handler, replace_handler,
};

/// The API routes, without CORS or Swagger UI.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/generate", post(generate_handler))
        .route("/jobs/{job_id}", get(poll_job_handler))
        .route("/finalize", post(finalize_handler))
        .route("/replace", post(replace_handler))
        .with_state(state)
}
