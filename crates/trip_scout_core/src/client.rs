//! crates/trip_scout_core/src/client.rs
//!
//! One scout per category: cache lookup, prompt, model call, parse.

use crate::cache::{fingerprint, ContentCache};
use crate::domain::{MealType, ScoutCategory, ScoutItem, ScoutRequest};
use crate::parse::{parse_candidates, parse_json_lines};
use crate::ports::{PortError, PortResult, TextModelService};
use crate::prompts::{replace_prompt, scout_prompt, ScoutPrompt};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const MODEL_TIMEOUT: Duration = Duration::from_secs(120);

/// Items produced by a scout, and whether they came from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutOutput {
    pub items: Vec<ScoutItem>,
    pub from_cache: bool,
}

#[derive(Clone)]
pub struct ScoutClient {
    category: ScoutCategory,
    model: Arc<dyn TextModelService>,
    cache: ContentCache,
    timeout: Duration,
}

impl ScoutClient {
    pub fn new(
        category: ScoutCategory,
        model: Arc<dyn TextModelService>,
        cache: ContentCache,
    ) -> Self {
        Self {
            category,
            model,
            cache,
            timeout: MODEL_TIMEOUT,
        }
    }

    pub fn photo(model: Arc<dyn TextModelService>, cache: ContentCache) -> Self {
        Self::new(ScoutCategory::Photos, model, cache)
    }

    pub fn dining(model: Arc<dyn TextModelService>, cache: ContentCache) -> Self {
        Self::new(ScoutCategory::Restaurants, model, cache)
    }

    pub fn attraction(model: Arc<dyn TextModelService>, cache: ContentCache) -> Self {
        Self::new(ScoutCategory::Attractions, model, cache)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn category(&self) -> ScoutCategory {
        self.category
    }

    async fn call_model(&self, prompt: &ScoutPrompt) -> PortResult<String> {
        tokio::time::timeout(
            self.timeout,
            self.model
                .complete(&prompt.system, &prompt.user, prompt.max_output_tokens),
        )
        .await
        .map_err(|_| {
            PortError::Timeout(format!(
                "{} model call exceeded {:?}",
                self.category.scout_name(),
                self.timeout
            ))
        })?
    }

    /// Returns cached items when available, otherwise asks the model.
    /// Model errors propagate; an unparseable answer is an empty list.
    pub async fn generate(&self, request: &ScoutRequest) -> PortResult<ScoutOutput> {
        let scout_name = self.category.scout_name();
        if let Some(items) = self.cache.get(&fingerprint(self.category, request)).await {
            info!("{}: cache hit for {}", scout_name, request.destination);
            return Ok(ScoutOutput {
                items,
                from_cache: true,
            });
        }

        let prompt = scout_prompt(self.category, request);
        let text = self.call_model(&prompt).await?;
        let items = parse_json_lines(self.category, &text, scout_name);
        info!(
            "{}: parsed {}/{} items for {}",
            scout_name,
            items.len(),
            request.expected_count(),
            request.destination
        );
        Ok(ScoutOutput {
            items,
            from_cache: false,
        })
    }

    /// Stores a verified result. Empty results are skipped by the cache itself.
    pub async fn remember(&self, request: &ScoutRequest, items: &[ScoutItem]) -> PortResult<()> {
        self.cache
            .set(&fingerprint(self.category, request), items)
            .await
    }

    /// Asks for a single substitute. Returns every parsed candidate in order.
    pub async fn generate_replacement(
        &self,
        request: &ScoutRequest,
        day: u32,
        meal_type: Option<MealType>,
        exclude_names: &[String],
    ) -> PortResult<Vec<ScoutItem>> {
        let prompt = replace_prompt(self.category, request, day, meal_type, exclude_names);
        let text = self.call_model(&prompt).await?;
        Ok(parse_candidates(self.category, &text, "Replace Scout"))
    }
}
