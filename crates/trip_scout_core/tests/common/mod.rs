#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trip_scout_core::domain::{Job, JobStatus, ScoutCategory};
use trip_scout_core::ports::{
    KeyValueStore, PlaceMatch, PlacesService, PortError, PortResult, ProfileService,
    TextModelService,
};
use trip_scout_core::retry::RetryPolicy;
use trip_scout_core::store::{InMemoryStore, InMemoryTripRepository};
use trip_scout_core::{PipelineOrchestrator, PipelineSettings, TravellerProfile};
use uuid::Uuid;

/// Which scout a system prompt belongs to.
pub fn category_of(system: &str) -> ScoutCategory {
    if system.starts_with("You are a photography") {
        ScoutCategory::Photos
    } else if system.starts_with("You are a dining") {
        ScoutCategory::Restaurants
    } else {
        ScoutCategory::Attractions
    }
}

/// A model whose answer per category is fixed up front. Records every call.
#[derive(Default)]
pub struct ScriptedModel {
    answers: Mutex<HashMap<ScoutCategory, Result<String, String>>>,
    calls: Mutex<Vec<(ScoutCategory, String, String)>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, category: ScoutCategory, text: &str) -> Self {
        self.respond(category, text);
        self
    }

    /// Changes the answer for later calls.
    pub fn respond(&self, category: ScoutCategory, text: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(category, Ok(text.to_string()));
    }

    pub fn fail(self, category: ScoutCategory) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(category, Err("upstream 529".to_string()));
        self
    }

    pub fn calls_for(&self, category: ScoutCategory) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _, _)| *c == category)
            .count()
    }

    pub fn user_prompts(&self, category: ScoutCategory) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _, _)| *c == category)
            .map(|(_, _, user)| user.clone())
            .collect()
    }
}

#[async_trait]
impl TextModelService for ScriptedModel {
    async fn complete(&self, system: &str, user: &str, _max: u32) -> PortResult<String> {
        let category = category_of(system);
        self.calls
            .lock()
            .unwrap()
            .push((category, system.to_string(), user.to_string()));
        match self.answers.lock().unwrap().get(&category) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(e)) => Err(PortError::Unexpected(e.clone())),
            None => Ok("I could not think of anything.".to_string()),
        }
    }
}

/// Places lookup answering by exact query prefix (the venue name).
#[derive(Default)]
pub struct ScriptedPlaces {
    by_name: HashMap<String, PlaceMatch>,
    pub calls: AtomicUsize,
}

impl ScriptedPlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, status: &str, lat: f64, lng: f64) -> Self {
        self.by_name.insert(
            name.to_string(),
            PlaceMatch {
                business_status: Some(status.to_string()),
                maps_url: Some(format!("https://maps.google.com/?q={}", name)),
                place_id: Some(format!("pid-{}", name)),
                lat: Some(lat),
                lng: Some(lng),
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesService for ScriptedPlaces {
    async fn search(&self, query: &str) -> PortResult<Option<PlaceMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = query.split(", ").next().unwrap_or_default();
        Ok(self.by_name.get(name).cloned())
    }
}

/// Profile lookup backed by a map.
#[derive(Default)]
pub struct FixedProfiles {
    pub profiles: HashMap<i64, TravellerProfile>,
}

#[async_trait]
impl ProfileService for FixedProfiles {
    async fn get_profile(&self, client_id: i64) -> PortResult<Option<TravellerProfile>> {
        Ok(self.profiles.get(&client_id).cloned())
    }
}

/// A key-value store that is always down.
/// A model that panics on every call.
pub struct PanickingModel;

#[async_trait]
impl TextModelService for PanickingModel {
    async fn complete(&self, _system: &str, _user: &str, _max: u32) -> PortResult<String> {
        panic!("model client crashed");
    }
}

pub struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> PortResult<Option<String>> {
        Err(PortError::Unexpected("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> PortResult<()> {
        Err(PortError::Unexpected("connection refused".into()))
    }
}

pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        retry: RetryPolicy::new(2, Duration::ZERO),
        model_label: "Test Model".to_string(),
        ..PipelineSettings::default()
    }
}

pub struct Harness {
    pub model: Arc<ScriptedModel>,
    pub store: Arc<InMemoryStore>,
    pub trips: Arc<InMemoryTripRepository>,
    pub orchestrator: PipelineOrchestrator,
}

pub fn harness(model: ScriptedModel) -> Harness {
    harness_with(model, fast_settings())
}

pub fn harness_with(model: ScriptedModel, settings: PipelineSettings) -> Harness {
    let model = Arc::new(model);
    let store = Arc::new(InMemoryStore::new());
    let trips = Arc::new(InMemoryTripRepository::new());
    let orchestrator =
        PipelineOrchestrator::new(model.clone(), store.clone(), trips.clone(), settings);
    Harness {
        model,
        store,
        trips,
        orchestrator,
    }
}

/// Polls until the job reaches a terminal state.
pub async fn wait_for_job(orchestrator: &PipelineOrchestrator, job_id: Uuid) -> Job {
    for _ in 0..500 {
        let job = orchestrator.poll_job(job_id).await.unwrap();
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never finished", job_id);
}

pub fn assert_status(job: &Job, status: JobStatus) {
    assert_eq!(job.status, status, "job: {:?}", job);
}

pub const PHOTO_LINES: &str = r#"{"day": 1, "time": "7:00-8:00am", "name": "Miradouro da Senhora do Monte", "address": "Largo Monte", "subject": "Rooftops"}
{"day": 2, "time": "6:30-7:30pm", "name": "Ponte 25 de Abril", "address": "Alcântara", "subject": "Bridge"}"#;

pub const DINING_LINES: &str = r#"{"day": 1, "meal_type": "lunch", "name": "Cervejaria Ramiro", "address": "Av. Almirante Reis 1", "price": "$$"}
{"day": 1, "meal_type": "dinner", "name": "Taberna da Rua das Flores", "address": "Rua das Flores 103", "price": "$$"}"#;

pub const ATTRACTION_LINES: &str = r#"{"day": 1, "name": "Castelo de São Jorge", "address": "Rua de Santa Cruz do Castelo", "category": "castle"}
{"day": 2, "name": "MAAT", "address": "Av. Brasília", "category": "museum"}"#;
