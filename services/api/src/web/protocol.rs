//! services/api/src/web/protocol.rs
//!
//! Defines the JSON bodies exchanged with the browser client. Trip requests
//! are accepted in the core `TripRequest` shape; everything else is mapped here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trip_scout_core::{
    Approvals, Job, JobStatus, MealType, PipelineOutcome, ReplaceRequest,
    ScoutCategory, ScoutItem,
};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request bodies
//=========================================================================================

/// Approved positions per section. A missing list approves every item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinalizeBody {
    pub session_id: Uuid,
    #[serde(default)]
    pub approved_photos: Option<Vec<i64>>,
    #[serde(default)]
    pub approved_restaurants: Option<Vec<i64>>,
    #[serde(default)]
    pub approved_attractions: Option<Vec<i64>>,
}

impl FinalizeBody {
    pub fn approvals(&self) -> Approvals {
        Approvals {
            photos: self.approved_photos.clone(),
            restaurants: self.approved_restaurants.clone(),
            attractions: self.approved_attractions.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceBody {
    pub session_id: Uuid,
    /// One of `photos`, `restaurants`, `attractions`.
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub category: ScoutCategory,
    pub index: i64,
    pub day: i64,
    /// One of `breakfast`, `lunch`, `dinner`.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub exclude_names: Vec<String>,
}

impl ReplaceBody {
    /// Rejects negative positions and days before the first.
    pub fn into_request(self) -> Result<ReplaceRequest, String> {
        let index = usize::try_from(self.index).map_err(|_| "index must be 0 or greater")?;
        let day = u32::try_from(self.day)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or("day must be 1 or greater")?;
        Ok(ReplaceRequest {
            session_id: self.session_id,
            category: self.category,
            index,
            day,
            meal_type: self.meal_type,
            exclude_names: self.exclude_names,
        })
    }
}

//=========================================================================================
// Response bodies
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub job_id: Uuid,
}

/// A job as seen by a poller. `result` is present once the job is done,
/// `error` once it failed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub job_id: Uuid,
    #[schema(value_type = String)]
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub result: Option<PipelineOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            message: job.message,
            result: job.result,
            error: job.error,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplaceResponse {
    #[schema(value_type = Object)]
    pub item: ScoutItem,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
