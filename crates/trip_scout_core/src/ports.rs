//! crates/trip_scout_core/src/ports.rs
//!
//! Defines the interfaces (ports) the pipeline uses to talk to the outside world.
//! Adapters in the service crate implement these traits.

use crate::domain::{StoredTrip, TravellerProfile, TripRecord};
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// A generic error type for port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Timed out: {0}")]
    Timeout(String),
}

pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// External services
//=========================================================================================

/// A chat-style text model.
#[async_trait]
pub trait TextModelService: Send + Sync {
    async fn complete(&self, system: &str, user: &str, max_output_tokens: u32)
        -> PortResult<String>;
}

/// The best match for a free-text place query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceMatch {
    pub business_status: Option<String>,
    pub maps_url: Option<String>,
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[async_trait]
pub trait PlacesService: Send + Sync {
    /// Returns `Ok(None)` when the lookup found nothing.
    async fn search(&self, query: &str) -> PortResult<Option<PlaceMatch>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait MapImageService: Send + Sync {
    async fn fetch(&self, url: &str) -> PortResult<MapImage>;
}

//=========================================================================================
// Storage
//=========================================================================================

/// String values with a per-key time to live. Shared by every worker process.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> PortResult<()>;

    /// Drops expired entries. Returns how many were removed.
    async fn purge_expired(&self) -> PortResult<usize> {
        Ok(0)
    }
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_profile(&self, client_id: i64) -> PortResult<Option<TravellerProfile>>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Inserts a new draft record and returns its id.
    async fn save_draft(&self, record: &TripRecord) -> PortResult<i64>;
    async fn find_by_session(&self, session_id: Uuid) -> PortResult<Option<StoredTrip>>;
    async fn update(&self, trip_id: i64, record: &TripRecord) -> PortResult<()>;
}
