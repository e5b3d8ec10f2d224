//! crates/trip_scout_core/src/request.rs
//!
//! Caller input validation. Everything that ends up inside a model prompt
//! passes through here first.

use crate::domain::{ScoutCategory, SectionRequest, TripParameters};
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

pub const MAX_LOCATION_LENGTH: usize = 100;
pub const MAX_FIELD_SHORT: usize = 150;
pub const MAX_FIELD_MEDIUM: usize = 500;
pub const MIN_DURATION: u32 = 1;
pub const MAX_DURATION: u32 = 14;
pub const MAX_EXCLUDE_NAME_LEN: usize = 100;
pub const MAX_EXCLUDE_LIST_LEN: usize = 50;

const DEFAULT_BUDGET: &str = "Moderate";
const DEFAULT_DISTANCE: &str = "Up to 30 minutes";

/// Collapses every whitespace run to a single space, trims, and truncates
/// to `max_len` characters. Returns `None` when nothing is left.
pub fn sanitize_line(value: &str, max_len: usize) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(max_len).collect();
    let truncated = truncated.trim_end().to_string();
    (!truncated.is_empty()).then_some(truncated)
}

/// Like `sanitize_line` but keeps inner newlines. Used for free-text notes.
pub fn sanitize_block(value: &str, max_len: usize) -> Option<String> {
    let truncated: String = value.trim().chars().take(max_len).collect();
    let truncated = truncated.trim_end().to_string();
    (!truncated.is_empty()).then_some(truncated)
}

/// Sanitises a replace exclusion list: blank names dropped, list capped.
pub fn sanitize_exclusions(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter_map(|name| sanitize_line(name, MAX_EXCLUDE_NAME_LEN))
        .take(MAX_EXCLUDE_LIST_LEN)
        .collect()
}

/// One section as the caller sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionInput {
    pub enabled: bool,
    pub per_day: Option<i64>,
    pub interests: Option<String>,
}

/// Raw trip request, before validation. Missing fields deserialize to their
/// empty value and are rejected or defaulted by `validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripRequest {
    pub location: String,
    pub duration: i64,
    pub budget: Option<String>,
    pub distance: Option<String>,
    pub accommodation: Option<String>,
    pub pre_planned: Option<String>,
    pub client_id: Option<i64>,
    pub photos: SectionInput,
    pub restaurants: SectionInput,
    pub attractions: SectionInput,
}

impl TripRequest {
    fn section_input(&self, category: ScoutCategory) -> &SectionInput {
        match category {
            ScoutCategory::Photos => &self.photos,
            ScoutCategory::Restaurants => &self.restaurants,
            ScoutCategory::Attractions => &self.attractions,
        }
    }

    /// Validates and normalises the request.
    pub fn validate(&self) -> Result<TripParameters, PipelineError> {
        let location = sanitize_line(&self.location, MAX_LOCATION_LENGTH)
            .ok_or_else(|| PipelineError::InvalidRequest("Location cannot be empty".into()))?;

        let duration = u32::try_from(self.duration)
            .ok()
            .filter(|d| (MIN_DURATION..=MAX_DURATION).contains(d))
            .ok_or_else(|| {
                PipelineError::InvalidRequest(format!(
                    "Duration must be between {} and {} days",
                    MIN_DURATION, MAX_DURATION
                ))
            })?;

        let sections: Vec<SectionRequest> = ScoutCategory::ALL
            .iter()
            .filter_map(|&category| {
                let input = self.section_input(category);
                input.enabled.then(|| SectionRequest {
                    category,
                    per_day: clamp_per_day(category, input.per_day),
                    interests: input
                        .interests
                        .as_deref()
                        .and_then(|i| sanitize_block(i, MAX_FIELD_MEDIUM))
                        .unwrap_or_default(),
                })
            })
            .collect();

        if sections.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "At least one section must be enabled".into(),
            ));
        }

        let short = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| sanitize_line(v, MAX_FIELD_SHORT))
        };

        Ok(TripParameters {
            location,
            duration,
            budget: short(&self.budget).unwrap_or_else(|| DEFAULT_BUDGET.to_string()),
            distance: short(&self.distance).unwrap_or_else(|| DEFAULT_DISTANCE.to_string()),
            accommodation: short(&self.accommodation),
            pre_planned: self
                .pre_planned
                .as_deref()
                .and_then(|p| sanitize_block(p, MAX_FIELD_MEDIUM)),
            client_id: self.client_id,
            sections,
        })
    }
}

fn clamp_per_day(category: ScoutCategory, requested: Option<i64>) -> u32 {
    let (min, max) = category.per_day_bounds();
    match requested {
        Some(value) => value.clamp(i64::from(min), i64::from(max)) as u32,
        None => category.default_per_day(),
    }
}
