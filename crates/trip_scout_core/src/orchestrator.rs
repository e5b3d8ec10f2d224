//! crates/trip_scout_core/src/orchestrator.rs
//!
//! The entry points the web layer calls: start a pipeline job, poll it,
//! finalize a session and replace a single item.

use crate::cache::ContentCache;
use crate::client::ScoutClient;
use crate::domain::{
    Approvals, FinalizedGuide, Job, JobStatus, PipelineOutcome, PipelineResult, ReplaceRequest,
    ReviewSession, ScoutCategory, ScoutItem, ScoutResults, StoredTrip, TravellerProfile,
    TripParameters, TripRecord, TripStatus,
};
use crate::error::{PipelineError, PipelineResultOf, GENERIC_FAILURE};
use crate::fanout::bounded_map;
use crate::maps::DayMapper;
use crate::palette::ColorPalette;
use crate::ports::{
    KeyValueStore, PlacesService, ProfileService, TextModelService, TripRepository,
};
use crate::request::{sanitize_exclusions, TripRequest};
use crate::retry::RetryPolicy;
use crate::runner::{ReplaceRunner, ScoutRunner};
use crate::store::{JobStore, SessionStore};
use crate::verify::VenueVerifier;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Plain tuning values for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub cache_ttl: Duration,
    pub session_ttl: Duration,
    pub job_ttl: Duration,
    pub retry: RetryPolicy,
    pub model_timeout: Duration,
    /// Reported to callers alongside results.
    pub model_label: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            session_ttl: Duration::from_secs(3600),
            job_ttl: Duration::from_secs(3600),
            retry: RetryPolicy::default(),
            model_timeout: crate::client::MODEL_TIMEOUT,
            model_label: "Scout model".to_string(),
        }
    }
}

/// Pushes job progress to the job store as the pipeline advances.
struct JobTracker {
    job: Job,
    jobs: JobStore,
}

impl JobTracker {
    async fn persist(&self) {
        if let Err(e) = self.jobs.save(&self.job).await {
            error!("Failed to persist job {}: {}", self.job.id, e);
        }
    }

    async fn stage(&mut self, progress: u8, message: &str) {
        self.job.advance(progress, message);
        self.persist().await;
    }
}

/// Moves a job whose run died without finishing to `failed`.
async fn fail_abandoned_job(jobs: &JobStore, job_id: Uuid) {
    let mut job = match jobs.load(job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            warn!("Job {} vanished before it could be marked failed", job_id);
            return;
        }
        Err(e) => {
            error!("Failed to load aborted job {}: {}", job_id, e);
            return;
        }
    };
    if job.status.is_terminal() {
        return;
    }
    if job.status == JobStatus::Pending {
        if let Err(e) = job.start("Starting scouts") {
            error!("Job {} could not start: {}", job_id, e);
            return;
        }
    }
    if let Err(e) = job.fail(GENERIC_FAILURE) {
        error!("Job {} could not be marked failed: {}", job_id, e);
        return;
    }
    if let Err(e) = jobs.save(&job).await {
        error!("Failed to persist job {}: {}", job_id, e);
    }
}

async fn report(tracker: &mut Option<&mut JobTracker>, progress: u8, message: &str) {
    if let Some(tracker) = tracker.as_deref_mut() {
        tracker.stage(progress, message).await;
    }
}

fn empty_category_warning(category: ScoutCategory, retry: &RetryPolicy) -> String {
    format!(
        "{} recommendations could not be generated for this destination after {} attempt(s). \
         You can proceed without this section or try again.",
        category.label(),
        retry.total_attempts()
    )
}

#[derive(Clone)]
pub struct PipelineOrchestrator {
    model: Arc<dyn TextModelService>,
    cache: ContentCache,
    sessions: SessionStore,
    jobs: JobStore,
    trips: Arc<dyn TripRepository>,
    profiles: Option<Arc<dyn ProfileService>>,
    verifier: VenueVerifier,
    day_maps: Option<DayMapper>,
    settings: PipelineSettings,
}

impl PipelineOrchestrator {
    pub fn new(
        model: Arc<dyn TextModelService>,
        store: Arc<dyn KeyValueStore>,
        trips: Arc<dyn TripRepository>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            model,
            cache: ContentCache::new(store.clone(), settings.cache_ttl),
            sessions: SessionStore::new(store.clone(), settings.session_ttl),
            jobs: JobStore::new(store, settings.job_ttl),
            trips,
            profiles: None,
            verifier: VenueVerifier::disabled(),
            day_maps: None,
            settings,
        }
    }

    pub fn with_places(mut self, places: Arc<dyn PlacesService>) -> Self {
        self.verifier = VenueVerifier::new(Some(places));
        self
    }

    pub fn with_verifier(mut self, verifier: VenueVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileService>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_day_maps(mut self, mapper: DayMapper) -> Self {
        self.day_maps = Some(mapper);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn client(&self, category: ScoutCategory) -> ScoutClient {
        ScoutClient::new(category, self.model.clone(), self.cache.clone())
            .with_timeout(self.settings.model_timeout)
    }

    //=====================================================================================
    // start_pipeline / poll_job
    //=====================================================================================

    /// Validates the request, records a pending job and runs the pipeline in
    /// the background. Returns as soon as the job is recorded.
    pub async fn start_pipeline(&self, request: TripRequest) -> PipelineResultOf<Uuid> {
        let params = request.validate()?;
        let job = Job::new();
        self.jobs.save(&job).await?;
        let job_id = job.id;

        info!(
            "Job {} queued for {} ({} days, sections: {:?})",
            job_id,
            params.location,
            params.duration,
            params.enabled_categories()
        );

        // The job outlives the request that started it. A panic inside the run
        // must still leave the job in a terminal state.
        let this = self.clone();
        let jobs = self.jobs.clone();
        tokio::spawn(async move {
            let run = tokio::spawn(async move { this.run_job(job, params).await });
            if let Err(e) = run.await {
                error!("Job {} aborted: {}", job_id, e);
                fail_abandoned_job(&jobs, job_id).await;
            }
        });

        Ok(job_id)
    }

    async fn run_job(&self, job: Job, params: TripParameters) {
        let mut tracker = JobTracker {
            job,
            jobs: self.jobs.clone(),
        };
        if let Err(e) = tracker.job.start("Starting scouts") {
            error!("Job {} could not start: {}", tracker.job.id, e);
            return;
        }
        tracker.persist().await;

        let result = self.run_stages(&params, Some(&mut tracker)).await;
        let transition = match result {
            Ok(outcome) => tracker.job.complete(outcome),
            Err(e) => {
                error!("Job {} failed: {}", tracker.job.id, e);
                tracker.job.fail(e.user_message())
            }
        };
        if let Err(e) = transition {
            error!("Job {} could not finish: {}", tracker.job.id, e);
        }
        tracker.persist().await;
        info!("Job {} ended as {:?}", tracker.job.id, tracker.job.status);
    }

    pub async fn poll_job(&self, job_id: Uuid) -> PipelineResultOf<Job> {
        self.jobs
            .load(job_id)
            .await?
            .ok_or(PipelineError::JobNotFound)
    }

    //=====================================================================================
    // The pipeline itself
    //=====================================================================================

    /// Runs the whole pipeline in the current task and returns its outcome.
    pub async fn generate(&self, params: &TripParameters) -> PipelineResultOf<PipelineOutcome> {
        self.run_stages(params, None).await
    }

    async fn load_profile(&self, client_id: Option<i64>) -> Option<TravellerProfile> {
        let (client_id, profiles) = (client_id?, self.profiles.as_ref()?);
        match profiles.get_profile(client_id).await {
            Ok(Some(profile)) => {
                let profile = profile.normalized();
                info!("Client profile loaded for id={}: {}", client_id, profile.is_some());
                profile
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Could not load client profile (id={}): {}", client_id, e);
                None
            }
        }
    }

    async fn resolve_origin(&self, params: &TripParameters) -> Option<(f64, f64)> {
        let address = params.accommodation.as_deref()?;
        let origin = self.verifier.geocode(address).await;
        if origin.is_none() {
            info!("No accommodation coordinates; travel times stay as generated");
        }
        origin
    }

    /// One scout attempt. Errors are logged and read as an empty result so the
    /// retry loop treats them like an empty answer.
    async fn attempt(
        &self,
        category: ScoutCategory,
        params: &TripParameters,
        profile: &Option<TravellerProfile>,
        origin: Option<(f64, f64)>,
    ) -> Vec<ScoutItem> {
        let request = params.scout_request(category, profile.clone());
        let runner = ScoutRunner::new(self.client(category), self.verifier.clone());
        match runner.run(&request, origin).await {
            Ok(items) => items,
            Err(e) => {
                error!(category = %category, "Scout run failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn run_stages(
        &self,
        params: &TripParameters,
        mut tracker: Option<&mut JobTracker>,
    ) -> PipelineResultOf<PipelineOutcome> {
        report(&mut tracker, 5, "Request validated").await;

        let profile = self.load_profile(params.client_id).await;
        report(&mut tracker, 10, "Traveller profile resolved").await;

        let origin = self.resolve_origin(params).await;
        report(&mut tracker, 15, "Accommodation located").await;

        let categories = params.enabled_categories();
        info!(
            "Active scouts: {:?} (places verification {})",
            categories,
            if self.verifier.is_enabled() { "on" } else { "off" }
        );
        report(&mut tracker, 20, "Scouting recommendations").await;

        let initial = bounded_map(categories.clone(), ScoutCategory::ALL.len(), |category| {
            let profile = &profile;
            async move {
                let items = self.attempt(category, params, profile, origin).await;
                info!(category = %category, "Initial run returned {} item(s)", items.len());
                (category, items)
            }
        })
        .await;
        let mut results: BTreeMap<ScoutCategory, Vec<ScoutItem>> = initial.into_iter().collect();
        report(&mut tracker, 60, "Scouts finished").await;

        let retry = self.settings.retry;
        for round in retry.retry_rounds() {
            let empty: Vec<ScoutCategory> = categories
                .iter()
                .copied()
                .filter(|c| results.get(c).map_or(true, Vec::is_empty))
                .collect();
            if empty.is_empty() {
                break;
            }
            warn!(
                "Retry {}/{} for scouts with no results: {:?}",
                round, retry.max_retries, empty
            );
            let progress = 60 + (20 * round / retry.max_retries.max(1)) as u8;
            report(&mut tracker, progress, "Retrying empty sections").await;
            retry.wait().await;

            for category in empty {
                let items = self.attempt(category, params, &profile, origin).await;
                info!(category = %category, "Retry {} returned {} item(s)", round, items.len());
                results.insert(category, items);
            }
        }

        let mut warnings = Vec::new();
        for &category in &categories {
            if results.get(&category).map_or(true, Vec::is_empty) {
                warn!(
                    category = %category,
                    "No results after {} attempt(s)",
                    retry.total_attempts()
                );
                warnings.push(empty_category_warning(category, &retry));
            }
        }
        if warnings.len() == categories.len() {
            return Err(PipelineError::NoResults);
        }

        report(&mut tracker, 90, "Saving review session").await;
        let mut scout_results = ScoutResults::default();
        for (category, items) in results {
            scout_results.insert(category, PipelineResult::new(items));
        }
        let mut session = ReviewSession {
            id: Uuid::new_v4(),
            parameters: params.clone(),
            colors: ColorPalette::for_location(&params.location),
            results: scout_results,
            trip_id: None,
            created_at: Utc::now(),
        };

        session.trip_id = match self.trips.save_draft(&TripRecord::draft(&session)).await {
            Ok(id) => {
                info!("Trip draft saved: id={} session={}", id, session.id);
                Some(id)
            }
            Err(e) => {
                error!("Failed to save trip draft: {}", e);
                None
            }
        };
        if let Err(e) = self.sessions.save(&session).await {
            error!("Failed to store review session {}: {}", session.id, e);
        }

        let results = &session.results;
        let photos = results.items(ScoutCategory::Photos).to_vec();
        let restaurants = results.items(ScoutCategory::Restaurants).to_vec();
        let attractions = results.items(ScoutCategory::Attractions).to_vec();
        info!(
            "Session {} created: {} photos, {} restaurants, {} attractions",
            session.id,
            photos.len(),
            restaurants.len(),
            attractions.len()
        );

        Ok(PipelineOutcome {
            session_id: session.id,
            trip_id: session.trip_id,
            location: params.location.clone(),
            duration: params.duration,
            colors: session.colors.clone(),
            photo_count: photos.len(),
            restaurant_count: restaurants.len(),
            attraction_count: attractions.len(),
            photos,
            restaurants,
            attractions,
            warnings,
            model: self.settings.model_label.clone(),
        })
    }

    //=====================================================================================
    // Session resolution
    //=====================================================================================

    /// Finds a session in the key-value store, falling back to the durable trip record.
    async fn resolve_session(
        &self,
        session_id: Uuid,
    ) -> PipelineResultOf<(ReviewSession, Option<StoredTrip>)> {
        let live = match self.sessions.load(session_id).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session lookup failed for {}: {}", session_id, e);
                None
            }
        };
        let stored = match self.trips.find_by_session(session_id).await {
            Ok(trip) => trip,
            Err(e) => {
                warn!("Trip lookup failed for session {}: {}", session_id, e);
                None
            }
        };

        match (live, stored) {
            (Some(session), stored) => {
                info!("Session {} resolved from the live store", session_id);
                Ok((session, stored))
            }
            (None, Some(trip)) => {
                info!("Session {} resolved from trip {}", session_id, trip.id);
                Ok((trip.record.to_session(trip.id), Some(trip)))
            }
            (None, None) => Err(PipelineError::SessionNotFound),
        }
    }

    //=====================================================================================
    // finalize
    //=====================================================================================

    /// Filters a session down to the approved items and prepares day maps.
    pub async fn finalize(
        &self,
        session_id: Uuid,
        approvals: &Approvals,
    ) -> PipelineResultOf<FinalizedGuide> {
        let (session, stored) = self.resolve_session(session_id).await?;

        let select = |category: ScoutCategory| {
            let items = session.results.items(category);
            let indices = approvals.resolve(category, items.len());
            let picked: Vec<ScoutItem> = indices.iter().map(|&i| items[i].clone()).collect();
            (indices, picked)
        };
        let (photo_indices, photos) = select(ScoutCategory::Photos);
        let (restaurant_indices, restaurants) = select(ScoutCategory::Restaurants);
        let (attraction_indices, attractions) = select(ScoutCategory::Attractions);

        if let Some(trip) = stored {
            let mut record = trip.record;
            record.set_approved(ScoutCategory::Photos, photo_indices);
            record.set_approved(ScoutCategory::Restaurants, restaurant_indices);
            record.set_approved(ScoutCategory::Attractions, attraction_indices);
            record.status = TripStatus::Finalized;
            record.updated_at = Utc::now();
            match self.trips.update(trip.id, &record).await {
                Ok(()) => info!("Trip {} finalized", trip.id),
                Err(e) => error!("Failed to finalize trip {}: {}", trip.id, e),
            }
        }

        info!(
            "Finalizing session {}: approved {} photos, {} restaurants, {} attractions",
            session_id,
            photos.len(),
            restaurants.len(),
            attractions.len()
        );

        let day_maps = match &self.day_maps {
            Some(mapper) => {
                mapper
                    .prefetch(&[
                        (ScoutCategory::Photos, photos.as_slice()),
                        (ScoutCategory::Attractions, attractions.as_slice()),
                    ])
                    .await
            }
            None => Vec::new(),
        };

        Ok(FinalizedGuide {
            session_id,
            trip_id: session.trip_id,
            location: session.parameters.location.clone(),
            duration: session.parameters.duration,
            colors: session.colors.clone(),
            photo_count: photos.len(),
            restaurant_count: restaurants.len(),
            attraction_count: attractions.len(),
            photos,
            restaurants,
            attractions,
            day_maps,
            model: self.settings.model_label.clone(),
        })
    }

    //=====================================================================================
    // replace_item
    //=====================================================================================

    /// Generates one substitute for a session slot and writes it back to both
    /// the live session and the trip record when the index is in range.
    pub async fn replace_item(&self, request: ReplaceRequest) -> PipelineResultOf<ScoutItem> {
        let exclude_names = sanitize_exclusions(&request.exclude_names);
        let (mut session, stored) = self.resolve_session(request.session_id).await?;
        let category = request.category;

        info!(
            "Replace: {} index={} day={} location={} excluded={}",
            category,
            request.index,
            request.day,
            session.parameters.location,
            exclude_names.len()
        );

        let profile = self.load_profile(session.parameters.client_id).await;
        let scout_request = session.parameters.scout_request(category, profile);
        let origin = self.resolve_origin(&session.parameters).await;

        let runner = ReplaceRunner::new(self.client(category), self.verifier.clone());
        let item = runner
            .run(
                &scout_request,
                request.day,
                request.meal_type,
                &exclude_names,
                origin,
            )
            .await?;

        if let Some(trip) = stored {
            let mut record = trip.record;
            if let Some(slot) = record.raw_items_mut(category).get_mut(request.index) {
                *slot = item.clone();
                record.updated_at = Utc::now();
                match self.trips.update(trip.id, &record).await {
                    Ok(()) => info!("Trip {} updated: {}[{}] replaced", trip.id, category, request.index),
                    Err(e) => error!("Replace: trip update failed: {}", e),
                }
            }
        }

        if let Some(slot) = session
            .results
            .get_mut(category)
            .and_then(|result| result.items.get_mut(request.index))
        {
            *slot = item.clone();
            if let Err(e) = self.sessions.save(&session).await {
                error!("Replace: session update failed: {}", e);
            }
        }

        Ok(item)
    }
}
