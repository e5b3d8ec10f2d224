//! crates/trip_scout_core/src/runner.rs
//!
//! Generate, verify, enrich. The unit the orchestrator launches and retries.

use crate::client::ScoutClient;
use crate::distance::apply_distances;
use crate::domain::{MealType, ScoutItem, ScoutRequest};
use crate::error::PipelineError;
use crate::ports::PortResult;
use crate::verify::VenueVerifier;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ScoutRunner {
    client: ScoutClient,
    verifier: VenueVerifier,
}

impl ScoutRunner {
    pub fn new(client: ScoutClient, verifier: VenueVerifier) -> Self {
        Self { client, verifier }
    }

    /// Runs one scout end to end. An empty list means "nothing usable", which
    /// covers both an unparseable answer and every venue being closed.
    pub async fn run(
        &self,
        request: &ScoutRequest,
        origin: Option<(f64, f64)>,
    ) -> PortResult<Vec<ScoutItem>> {
        let output = self.client.generate(request).await?;
        if output.from_cache {
            return Ok(output.items);
        }

        let mut items = self
            .verifier
            .verify_batch(output.items, &request.destination)
            .await
            .kept;
        if let Some((lat, lng)) = origin {
            apply_distances(&mut items, lat, lng);
        }

        if let Err(e) = self.client.remember(request, &items).await {
            warn!(
                "{}: could not cache result: {}",
                self.client.category().scout_name(),
                e
            );
        }
        Ok(items)
    }
}

/// Produces exactly one substitute item for a session slot.
#[derive(Clone)]
pub struct ReplaceRunner {
    client: ScoutClient,
    verifier: VenueVerifier,
}

impl ReplaceRunner {
    pub fn new(client: ScoutClient, verifier: VenueVerifier) -> Self {
        Self { client, verifier }
    }

    /// The first candidate whose name is not excluded wins. A candidate that
    /// verification drops as closed counts as no alternative.
    pub async fn run(
        &self,
        request: &ScoutRequest,
        day: u32,
        meal_type: Option<MealType>,
        exclude_names: &[String],
        origin: Option<(f64, f64)>,
    ) -> Result<ScoutItem, PipelineError> {
        let scout_name = self.client.category().scout_name();
        let candidates = self
            .client
            .generate_replacement(request, day, meal_type, exclude_names)
            .await?;

        let Some(mut item) = candidates
            .into_iter()
            .find(|candidate| !exclude_names.iter().any(|n| n == candidate.name()))
        else {
            warn!("{}: no usable replacement for day {}", scout_name, day);
            return Err(PipelineError::NoAlternative);
        };
        item.venue_mut().day = day;

        let mut kept = self
            .verifier
            .verify_batch(vec![item], &request.destination)
            .await
            .kept;
        if let Some((lat, lng)) = origin {
            apply_distances(&mut kept, lat, lng);
        }

        match kept.pop() {
            Some(item) => {
                info!("{}: replacement {:?} for day {}", scout_name, item.name(), day);
                Ok(item)
            }
            None => {
                warn!("{}: replacement was closed, nothing to offer", scout_name);
                Err(PipelineError::NoAlternative)
            }
        }
    }
}
