//! crates/trip_scout_core/src/domain.rs
//!
//! Defines the core data structures for the scout pipeline.
//! These structs carry no knowledge of the database, the model vendor or the
//! HTTP layer; they are only shaped for JSON so they can be persisted as-is.

use crate::palette::ColorPalette;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Categories
//=========================================================================================

/// One of the three recommendation categories a guide can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoutCategory {
    Photos,
    Restaurants,
    Attractions,
}

impl ScoutCategory {
    pub const ALL: [ScoutCategory; 3] = [
        ScoutCategory::Photos,
        ScoutCategory::Restaurants,
        ScoutCategory::Attractions,
    ];

    /// The key used for this category in payloads and persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoutCategory::Photos => "photos",
            ScoutCategory::Restaurants => "restaurants",
            ScoutCategory::Attractions => "attractions",
        }
    }

    /// Human-facing section name, used in warnings.
    pub fn label(&self) -> &'static str {
        match self {
            ScoutCategory::Photos => "Photography",
            ScoutCategory::Restaurants => "Dining",
            ScoutCategory::Attractions => "Attractions",
        }
    }

    pub fn scout_name(&self) -> &'static str {
        match self {
            ScoutCategory::Photos => "Photo Scout",
            ScoutCategory::Restaurants => "Restaurant Scout",
            ScoutCategory::Attractions => "Attraction Scout",
        }
    }

    /// Tag mixed into the content fingerprint.
    pub fn fingerprint_tag(&self) -> &'static str {
        match self {
            ScoutCategory::Photos => "photo",
            ScoutCategory::Restaurants => "restaurant",
            ScoutCategory::Attractions => "attraction",
        }
    }

    pub fn default_per_day(&self) -> u32 {
        match self {
            ScoutCategory::Photos => 3,
            ScoutCategory::Restaurants => 3,
            ScoutCategory::Attractions => 4,
        }
    }

    /// Inclusive bounds a per-day count is clamped into.
    pub fn per_day_bounds(&self) -> (u32, u32) {
        match self {
            ScoutCategory::Photos => (1, 10),
            ScoutCategory::Restaurants => (1, 8),
            ScoutCategory::Attractions => (1, 10),
        }
    }
}

impl fmt::Display for ScoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

//=========================================================================================
// Scout inputs
//=========================================================================================

/// Optional personalisation for a traveller. Absent fields mean "no preference".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravellerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TravellerProfile {
    /// Trims every field and drops the blank ones. Returns `None` when nothing is left.
    pub fn normalized(self) -> Option<Self> {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let profile = Self {
            home_city: keep(self.home_city),
            preferred_budget: keep(self.preferred_budget),
            travel_style: keep(self.travel_style),
            dietary_requirements: keep(self.dietary_requirements),
            notes: keep(self.notes),
        };
        (!profile.is_empty()).then_some(profile)
    }

    pub fn is_empty(&self) -> bool {
        self.home_city.is_none()
            && self.preferred_budget.is_none()
            && self.travel_style.is_none()
            && self.dietary_requirements.is_none()
            && self.notes.is_none()
    }
}

/// Everything one scout needs to produce its list. Also the input to the cache fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutRequest {
    pub destination: String,
    pub duration: u32,
    pub per_day: u32,
    pub interests: String,
    pub budget: String,
    pub radius: String,
    pub accommodation: Option<String>,
    pub pre_planned: Option<String>,
    pub profile: Option<TravellerProfile>,
}

impl ScoutRequest {
    /// How many items the model is asked for. Not enforced on the output.
    pub fn expected_count(&self) -> u32 {
        self.duration * self.per_day
    }
}

//=========================================================================================
// Scout items
//=========================================================================================

/// Operational status reported by the places lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
    Unverified,
}

impl VenueStatus {
    /// Maps a raw business status onto the known set; anything unrecognised is `Unverified`.
    pub fn from_business_status(raw: &str) -> Self {
        match raw {
            "OPERATIONAL" => VenueStatus::Operational,
            "CLOSED_TEMPORARILY" => VenueStatus::ClosedTemporarily,
            "CLOSED_PERMANENTLY" => VenueStatus::ClosedPermanently,
            _ => VenueStatus::Unverified,
        }
    }

    /// Temporarily and permanently closed venues are treated the same: dropped.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            VenueStatus::ClosedTemporarily | VenueStatus::ClosedPermanently
        )
    }
}

/// The outcome of checking one venue against the places lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub status: VenueStatus,
    pub maps_url: Option<String>,
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Verification {
    pub fn unverified() -> Self {
        Self {
            status: VenueStatus::Unverified,
            maps_url: None,
            place_id: None,
            lat: None,
            lng: None,
        }
    }
}

fn first_day() -> u32 {
    1
}

/// Fields every recommendation shares, whatever its category.
///
/// The underscore-prefixed fields are written by verification, never by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default = "first_day")]
    pub day: u32,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<String>,
    #[serde(rename = "_status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VenueStatus>,
    #[serde(rename = "_maps_url", default, skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
    #[serde(rename = "_place_id", default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(rename = "_lat", default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(rename = "_lng", default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Venue {
    pub fn apply_verification(&mut self, verification: &Verification) {
        self.status = Some(verification.status);
        self.maps_url = verification.maps_url.clone();
        self.place_id = verification.place_id.clone();
        self.lat = verification.lat;
        self.lng = verification.lng;
    }

    /// Resolved coordinates, only when both halves are known.
    pub fn resolved_coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSpot {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub setup: String,
    #[serde(default)]
    pub light: String,
    #[serde(default)]
    pub pro_tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningSpot {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(default)]
    pub meal_type: String,
    /// Neighbourhood.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub signature_dish: String,
    #[serde(default)]
    pub ambiance: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub why_this_client: String,
    #[serde(default)]
    pub insider_tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionSpot {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub category: String,
    /// Neighbourhood.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub admission: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub best_time: String,
    #[serde(default)]
    pub why_this_client: String,
    #[serde(default)]
    pub highlight: String,
    #[serde(default)]
    pub insider_tip: String,
}

/// One generated recommendation, typed by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoutItem {
    Photo(PhotoSpot),
    Dining(DiningSpot),
    Attraction(AttractionSpot),
}

impl ScoutItem {
    /// Decodes one JSON object emitted by the model for the given category.
    pub fn from_model_json(category: ScoutCategory, raw: &str) -> serde_json::Result<Self> {
        match category {
            ScoutCategory::Photos => serde_json::from_str::<PhotoSpot>(raw).map(ScoutItem::Photo),
            ScoutCategory::Restaurants => {
                serde_json::from_str::<DiningSpot>(raw).map(ScoutItem::Dining)
            }
            ScoutCategory::Attractions => {
                serde_json::from_str::<AttractionSpot>(raw).map(ScoutItem::Attraction)
            }
        }
    }

    pub fn category(&self) -> ScoutCategory {
        match self {
            ScoutItem::Photo(_) => ScoutCategory::Photos,
            ScoutItem::Dining(_) => ScoutCategory::Restaurants,
            ScoutItem::Attraction(_) => ScoutCategory::Attractions,
        }
    }

    pub fn venue(&self) -> &Venue {
        match self {
            ScoutItem::Photo(spot) => &spot.venue,
            ScoutItem::Dining(spot) => &spot.venue,
            ScoutItem::Attraction(spot) => &spot.venue,
        }
    }

    pub fn venue_mut(&mut self) -> &mut Venue {
        match self {
            ScoutItem::Photo(spot) => &mut spot.venue,
            ScoutItem::Dining(spot) => &mut spot.venue,
            ScoutItem::Attraction(spot) => &mut spot.venue,
        }
    }

    pub fn name(&self) -> &str {
        &self.venue().name
    }

    pub fn day(&self) -> u32 {
        self.venue().day
    }
}

//=========================================================================================
// Pipeline results and sessions
//=========================================================================================

/// One category's output. An empty `items` list is a finished, valid result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub items: Vec<ScoutItem>,
    pub generated_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn new(items: Vec<ScoutItem>) -> Self {
        Self {
            items,
            generated_at: Utc::now(),
        }
    }
}

/// Per-category results. `None` means the category was not run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoutResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<PipelineResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurants: Option<PipelineResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attractions: Option<PipelineResult>,
}

impl ScoutResults {
    fn slot(&self, category: ScoutCategory) -> &Option<PipelineResult> {
        match category {
            ScoutCategory::Photos => &self.photos,
            ScoutCategory::Restaurants => &self.restaurants,
            ScoutCategory::Attractions => &self.attractions,
        }
    }

    fn slot_mut(&mut self, category: ScoutCategory) -> &mut Option<PipelineResult> {
        match category {
            ScoutCategory::Photos => &mut self.photos,
            ScoutCategory::Restaurants => &mut self.restaurants,
            ScoutCategory::Attractions => &mut self.attractions,
        }
    }

    pub fn get(&self, category: ScoutCategory) -> Option<&PipelineResult> {
        self.slot(category).as_ref()
    }

    pub fn get_mut(&mut self, category: ScoutCategory) -> Option<&mut PipelineResult> {
        self.slot_mut(category).as_mut()
    }

    pub fn insert(&mut self, category: ScoutCategory, result: PipelineResult) {
        *self.slot_mut(category) = Some(result);
    }

    /// The items for a category, or an empty slice when it was not run.
    pub fn items(&self, category: ScoutCategory) -> &[ScoutItem] {
        self.get(category)
            .map(|result| result.items.as_slice())
            .unwrap_or_default()
    }
}

/// What a caller asked for in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRequest {
    pub category: ScoutCategory,
    pub per_day: u32,
    pub interests: String,
}

/// Validated trip parameters. Produced by `TripRequest::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripParameters {
    pub location: String,
    pub duration: u32,
    pub budget: String,
    pub distance: String,
    pub accommodation: Option<String>,
    pub pre_planned: Option<String>,
    pub client_id: Option<i64>,
    pub sections: Vec<SectionRequest>,
}

impl TripParameters {
    pub fn section(&self, category: ScoutCategory) -> Option<&SectionRequest> {
        self.sections.iter().find(|s| s.category == category)
    }

    pub fn enabled_categories(&self) -> Vec<ScoutCategory> {
        self.sections.iter().map(|s| s.category).collect()
    }

    /// Builds the scout input for one category, falling back to that
    /// category's defaults when it was not part of the original run.
    pub fn scout_request(
        &self,
        category: ScoutCategory,
        profile: Option<TravellerProfile>,
    ) -> ScoutRequest {
        let (per_day, interests) = match self.section(category) {
            Some(section) => (section.per_day, section.interests.clone()),
            None => (category.default_per_day(), String::new()),
        };
        ScoutRequest {
            destination: self.location.clone(),
            duration: self.duration,
            per_day,
            interests,
            budget: self.budget.clone(),
            radius: self.distance.clone(),
            accommodation: self.accommodation.clone(),
            pre_planned: self.pre_planned.clone(),
            profile,
        }
    }

    /// "Lisbon: 2 days"
    pub fn title(&self) -> String {
        let plural = if self.duration == 1 { "" } else { "s" };
        format!("{}: {} day{}", self.location, self.duration, plural)
    }
}

/// A completed pipeline run awaiting the traveller's approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSession {
    pub id: Uuid,
    pub parameters: TripParameters,
    pub colors: ColorPalette,
    pub results: ScoutResults,
    pub trip_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// The payload a finished job carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub session_id: Uuid,
    pub trip_id: Option<i64>,
    pub location: String,
    pub duration: u32,
    pub colors: ColorPalette,
    pub photos: Vec<ScoutItem>,
    pub restaurants: Vec<ScoutItem>,
    pub attractions: Vec<ScoutItem>,
    pub photo_count: usize,
    pub restaurant_count: usize,
    pub attraction_count: usize,
    pub warnings: Vec<String>,
    pub model: String,
}

//=========================================================================================
// Jobs
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// pending → running → done | failed. Nothing else.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Done)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job cannot move from {from:?} to {to:?}")]
pub struct JobTransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Progress record for one pipeline run, pollable from any process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PipelineOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            progress: 0,
            message: "Queued".to_string(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), JobTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(JobTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn start(&mut self, message: impl Into<String>) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Running)?;
        self.message = message.into();
        Ok(())
    }

    /// Records progress on a running job. Progress never moves backwards.
    pub fn advance(&mut self, progress: u8, message: impl Into<String>) {
        if self.status != JobStatus::Running {
            return;
        }
        self.progress = self.progress.max(progress.min(99));
        self.message = message.into();
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self, outcome: PipelineOutcome) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Done)?;
        self.progress = 100;
        self.message = "Done".to_string();
        self.result = Some(outcome);
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Failed)?;
        self.progress = 100;
        self.message = "Failed".to_string();
        self.error = Some(error.into());
        Ok(())
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================================
// Durable trip record
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Draft,
    Finalized,
}

/// The per-trip JSON document that lets another process pick up a session
/// after the key-value copy has expired. `session_id` links the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub session_id: Uuid,
    pub client_id: Option<i64>,
    pub status: TripStatus,
    pub title: String,
    pub parameters: TripParameters,
    pub colors: ColorPalette,
    #[serde(default)]
    pub raw_photos: Vec<ScoutItem>,
    #[serde(default)]
    pub raw_restaurants: Vec<ScoutItem>,
    #[serde(default)]
    pub raw_attractions: Vec<ScoutItem>,
    #[serde(default)]
    pub approved_photo_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub approved_restaurant_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub approved_attraction_indices: Option<Vec<usize>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripRecord {
    pub fn draft(session: &ReviewSession) -> Self {
        let now = Utc::now();
        let results = &session.results;
        Self {
            session_id: session.id,
            client_id: session.parameters.client_id,
            status: TripStatus::Draft,
            title: session.parameters.title(),
            parameters: session.parameters.clone(),
            colors: session.colors.clone(),
            raw_photos: results.items(ScoutCategory::Photos).to_vec(),
            raw_restaurants: results.items(ScoutCategory::Restaurants).to_vec(),
            raw_attractions: results.items(ScoutCategory::Attractions).to_vec(),
            approved_photo_indices: None,
            approved_restaurant_indices: None,
            approved_attraction_indices: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn raw_items(&self, category: ScoutCategory) -> &Vec<ScoutItem> {
        match category {
            ScoutCategory::Photos => &self.raw_photos,
            ScoutCategory::Restaurants => &self.raw_restaurants,
            ScoutCategory::Attractions => &self.raw_attractions,
        }
    }

    pub fn raw_items_mut(&mut self, category: ScoutCategory) -> &mut Vec<ScoutItem> {
        match category {
            ScoutCategory::Photos => &mut self.raw_photos,
            ScoutCategory::Restaurants => &mut self.raw_restaurants,
            ScoutCategory::Attractions => &mut self.raw_attractions,
        }
    }

    pub fn set_approved(&mut self, category: ScoutCategory, indices: Vec<usize>) {
        let slot = match category {
            ScoutCategory::Photos => &mut self.approved_photo_indices,
            ScoutCategory::Restaurants => &mut self.approved_restaurant_indices,
            ScoutCategory::Attractions => &mut self.approved_attraction_indices,
        };
        *slot = Some(indices);
    }

    /// Rebuilds a review session from the durable record.
    pub fn to_session(&self, trip_id: i64) -> ReviewSession {
        let mut results = ScoutResults::default();
        for category in self.parameters.enabled_categories() {
            results.insert(
                category,
                PipelineResult {
                    items: self.raw_items(category).clone(),
                    generated_at: self.created_at,
                },
            );
        }
        ReviewSession {
            id: self.session_id,
            parameters: self.parameters.clone(),
            colors: self.colors.clone(),
            results,
            trip_id: Some(trip_id),
            created_at: self.created_at,
        }
    }
}

/// A trip record together with its database id.
#[derive(Debug, Clone)]
pub struct StoredTrip {
    pub id: i64,
    pub record: TripRecord,
}

//=========================================================================================
// Finalize and replace
//=========================================================================================

/// Approved positions per category. `None` approves every item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approvals {
    #[serde(default)]
    pub photos: Option<Vec<i64>>,
    #[serde(default)]
    pub restaurants: Option<Vec<i64>>,
    #[serde(default)]
    pub attractions: Option<Vec<i64>>,
}

impl Approvals {
    /// Resolves the approved positions for a list of `total` items.
    /// Out-of-range positions are dropped.
    pub fn resolve(&self, category: ScoutCategory, total: usize) -> Vec<usize> {
        let requested = match category {
            ScoutCategory::Photos => &self.photos,
            ScoutCategory::Restaurants => &self.restaurants,
            ScoutCategory::Attractions => &self.attractions,
        };
        match requested {
            None => (0..total).collect(),
            Some(indices) => indices
                .iter()
                .filter_map(|&i| usize::try_from(i).ok())
                .filter(|&i| i < total)
                .collect(),
        }
    }
}

/// A rendered-ready map for one day of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMap {
    pub category: ScoutCategory,
    pub day: u32,
    /// `data:<mime>;base64,...`, or `None` when the image could not be fetched.
    pub image: Option<String>,
    pub maps_link: String,
    pub names: Vec<String>,
}

/// The approved subset of a session, handed to document rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedGuide {
    pub session_id: Uuid,
    pub trip_id: Option<i64>,
    pub location: String,
    pub duration: u32,
    pub colors: ColorPalette,
    pub photos: Vec<ScoutItem>,
    pub restaurants: Vec<ScoutItem>,
    pub attractions: Vec<ScoutItem>,
    pub photo_count: usize,
    pub restaurant_count: usize,
    pub attraction_count: usize,
    pub day_maps: Vec<DayMap>,
    pub model: String,
}

/// A request to regenerate one item of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRequest {
    pub session_id: Uuid,
    pub category: ScoutCategory,
    pub index: usize,
    pub day: u32,
    pub meal_type: Option<MealType>,
    pub exclude_names: Vec<String>,
}
