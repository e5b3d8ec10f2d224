//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, GooglePlacesAdapter, HttpMapImageAdapter, OpenAiScoutAdapter},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_scout_core::maps::DayMapper;
use trip_scout_core::ports::{KeyValueStore, ProfileService, TripRepository};
use trip_scout_core::store::{FallbackStore, InMemoryStore, InMemoryTripRepository};
use trip_scout_core::PipelineOrchestrator;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const PURGE_INTERVAL: Duration = Duration::from_secs(300);

struct Storage {
    kv: Arc<dyn KeyValueStore>,
    trips: Arc<dyn TripRepository>,
    profiles: Option<Arc<dyn ProfileService>>,
}

/// Connects to Postgres when configured and reachable, otherwise falls back
/// to process-local stores.
async fn connect_storage(config: &Config) -> Result<Storage, ApiError> {
    let in_memory = || Storage {
        kv: Arc::new(InMemoryStore::new()),
        trips: Arc::new(InMemoryTripRepository::new()),
        profiles: None,
    };

    let Some(database_url) = &config.database_url else {
        warn!("DATABASE_URL not set; sessions and jobs are kept in this process only");
        return Ok(in_memory());
    };

    info!("Connecting to database...");
    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Database unreachable ({}); using in-memory stores", e);
            return Ok(in_memory());
        }
    };

    let db = Arc::new(DbAdapter::new(pool));
    info!("Running database migrations...");
    db.run_migrations().await?;
    info!("Database migrations complete.");

    Ok(Storage {
        kv: Arc::new(FallbackStore::new(db.clone())),
        trips: db.clone(),
        profiles: Some(db),
    })
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Storage ---
    let storage = connect_storage(&config).await?;

    // --- 3. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url.clone());
    }
    let model = Arc::new(OpenAiScoutAdapter::new(
        Client::with_config(openai_config),
        config.scout_model.clone(),
    ));

    let mut pipeline = PipelineOrchestrator::new(
        model,
        storage.kv.clone(),
        storage.trips,
        config.pipeline_settings(),
    );
    if let Some(profiles) = storage.profiles {
        pipeline = pipeline.with_profiles(profiles);
    }
    match &config.places_api_key {
        Some(key) => {
            let http = reqwest::Client::new();
            pipeline = pipeline
                .with_places(Arc::new(GooglePlacesAdapter::new(http.clone(), key.clone())))
                .with_day_maps(DayMapper::new(
                    key.clone(),
                    Arc::new(HttpMapImageAdapter::new(http)),
                ));
            info!("Places verification and day maps enabled");
        }
        None => warn!("GOOGLE_PLACES_API_KEY not set; venues will be marked UNVERIFIED"),
    }

    // --- 4. Expired entry sweeper ---
    let kv = storage.kv;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match kv.purge_expired().await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired entries", n),
                Err(e) => warn!("Purging expired entries failed: {}", e),
            }
        }
    });

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(pipeline));

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // --- 6. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
