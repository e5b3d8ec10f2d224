//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use trip_scout_core::PipelineOrchestrator;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PipelineOrchestrator,
    /// Reported by the health endpoint.
    pub model_label: String,
}

impl AppState {
    pub fn new(pipeline: PipelineOrchestrator) -> Self {
        let model_label = pipeline.settings().model_label.clone();
        Self {
            pipeline,
            model_label,
        }
    }
}
