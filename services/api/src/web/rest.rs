//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::protocol::{
    ErrorBody, FinalizeBody, GenerateResponse, HealthResponse, JobResponse, ReplaceBody,
    ReplaceResponse,
};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::info;
use trip_scout_core::{PipelineError, TripRequest};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        generate_handler,
        poll_job_handler,
        finalize_handler,
        replace_handler,
    ),
    components(
        schemas(
            HealthResponse,
            GenerateResponse,
            JobResponse,
            FinalizeBody,
            ReplaceBody,
            ReplaceResponse,
            ErrorBody
        )
    ),
    tags(
        (name = "Trip Scout API", description = "Generate, review and finalize personalised travel guides.")
    )
)]
pub struct ApiDoc;

/// Unwraps a JSON body, turning axum's rejection into the API's error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: format!("Travel guide API running with {}", app_state.model_label),
    })
}

/// Start a guide generation job.
///
/// Validation happens before the job is created; the scouts run in the background.
#[utoipa::path(
    post,
    path = "/generate",
    request_body(content_type = "application/json", description = "Trip parameters and enabled sections."),
    responses(
        (status = 202, description = "Job accepted", body = GenerateResponse),
        (status = 400, description = "Invalid trip parameters", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let job_id = app_state.pipeline.start_pipeline(request).await?;
    info!("Accepted generation job {}", job_id);
    Ok((StatusCode::ACCEPTED, Json(GenerateResponse { job_id })))
}

/// Poll a generation job.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    responses(
        (status = 200, description = "Current job state", body = JobResponse),
        (status = 404, description = "Unknown or expired job", body = ErrorBody)
    ),
    params(
        ("job_id" = String, Path, description = "The id returned by /generate.")
    )
)]
pub async fn poll_job_handler(
    State(app_state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let job_id = Uuid::parse_str(&job_id).map_err(|_| PipelineError::JobNotFound)?;
    let job = app_state.pipeline.poll_job(job_id).await?;
    Ok(Json(JobResponse::from(job)))
}

/// Filter a review session down to the approved items.
#[utoipa::path(
    post,
    path = "/finalize",
    request_body(content = FinalizeBody, content_type = "application/json"),
    responses(
        (status = 200, description = "The approved guide with day maps"),
        (status = 404, description = "Session could not be resolved", body = ErrorBody)
    )
)]
pub async fn finalize_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<FinalizeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;
    let guide = app_state
        .pipeline
        .finalize(body.session_id, &body.approvals())
        .await?;
    Ok(Json(guide))
}

/// Regenerate one item of a review session.
#[utoipa::path(
    post,
    path = "/replace",
    request_body(content = ReplaceBody, content_type = "application/json"),
    responses(
        (status = 200, description = "The replacement item", body = ReplaceResponse),
        (status = 400, description = "Invalid index or day", body = ErrorBody),
        (status = 404, description = "Session could not be resolved", body = ErrorBody),
        (status = 422, description = "No alternative could be found", body = ErrorBody)
    )
)]
pub async fn replace_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ReplaceBody>, JsonRejection>,
) -> Result<Json<ReplaceResponse>, ApiError> {
    let request = json_body(payload)?
        .into_request()
        .map_err(ApiError::BadRequest)?;
    let item = app_state.pipeline.replace_item(request).await?;
    Ok(Json(ReplaceResponse { item }))
}
