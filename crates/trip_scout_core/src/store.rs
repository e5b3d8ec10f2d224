//! crates/trip_scout_core/src/store.rs
//!
//! Session and job records on top of the shared key-value port, plus the
//! per-process in-memory fallbacks used when no durable backend is reachable.
//! The fallbacks are not visible across processes.

use crate::domain::{Job, ReviewSession, StoredTrip, TripRecord};
use crate::ports::{KeyValueStore, PortError, PortResult, TripRepository};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

const SESSION_PREFIX: &str = "session:";
const JOB_PREFIX: &str = "job:";

//=========================================================================================
// In-memory key-value fallback
//=========================================================================================

/// Process-local key-value store. Expiry is checked on read and swept on purge.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn remove(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> PortResult<()> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    async fn purge_expired(&self) -> PortResult<usize> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        Ok(before - entries.len())
    }
}

//=========================================================================================
// Durable store with a local fallback
//=========================================================================================

/// Wraps a durable store and keeps serving from process memory while it is
/// unreachable. An entry is held locally only while its latest write failed to
/// reach the durable store, so a local entry is always the newest value.
pub struct FallbackStore {
    durable: Arc<dyn KeyValueStore>,
    local: InMemoryStore,
}

impl FallbackStore {
    pub fn new(durable: Arc<dyn KeyValueStore>) -> Self {
        Self {
            durable,
            local: InMemoryStore::new(),
        }
    }
}

#[async_trait]
impl KeyValueStore for FallbackStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        if let Some(value) = self.local.get(key).await? {
            return Ok(Some(value));
        }
        match self.durable.get(key).await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Key-value store read failed for {}; treating it as missing: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> PortResult<()> {
        match self.durable.set(key, value.clone(), ttl).await {
            Ok(()) => {
                self.local.remove(key).await;
                Ok(())
            }
            Err(e) => {
                warn!("Key-value store write failed for {}; keeping it locally: {}", key, e);
                self.local.set(key, value, ttl).await
            }
        }
    }

    async fn purge_expired(&self) -> PortResult<usize> {
        let local = self.local.purge_expired().await?;
        match self.durable.purge_expired().await {
            Ok(durable) => Ok(durable + local),
            Err(e) => {
                warn!("Durable expired-entry sweep failed: {}", e);
                Ok(local)
            }
        }
    }
}

//=========================================================================================
// Typed record stores
//=========================================================================================

async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PortResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PortError::Unexpected(format!("corrupt record {}: {}", key, e))),
        None => Ok(None),
    }
}

async fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> PortResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
    store.set(key, raw, ttl).await
}

/// Review sessions, keyed by session id.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Saves a session, sweeping expired entries first.
    pub async fn save(&self, session: &ReviewSession) -> PortResult<()> {
        match self.store.purge_expired().await {
            Ok(0) => {}
            Ok(n) => info!("Evicted {} expired record(s)", n),
            Err(e) => warn!("Expired record sweep failed: {}", e),
        }
        save_json(
            self.store.as_ref(),
            &format!("{}{}", SESSION_PREFIX, session.id),
            session,
            self.ttl,
        )
        .await
    }

    pub async fn load(&self, session_id: Uuid) -> PortResult<Option<ReviewSession>> {
        load_json(
            self.store.as_ref(),
            &format!("{}{}", SESSION_PREFIX, session_id),
        )
        .await
    }
}

/// Job records, keyed by job id.
#[derive(Clone)]
pub struct JobStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl JobStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn save(&self, job: &Job) -> PortResult<()> {
        save_json(
            self.store.as_ref(),
            &format!("{}{}", JOB_PREFIX, job.id),
            job,
            self.ttl,
        )
        .await
    }

    pub async fn load(&self, job_id: Uuid) -> PortResult<Option<Job>> {
        load_json(self.store.as_ref(), &format!("{}{}", JOB_PREFIX, job_id)).await
    }
}

//=========================================================================================
// In-memory trip repository
//=========================================================================================

#[derive(Default)]
pub struct InMemoryTripRepository {
    trips: Mutex<Vec<TripRecord>>,
}

impl InMemoryTripRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripRepository for InMemoryTripRepository {
    async fn save_draft(&self, record: &TripRecord) -> PortResult<i64> {
        let mut trips = self.trips.lock().await;
        trips.push(record.clone());
        Ok(trips.len() as i64)
    }

    async fn find_by_session(&self, session_id: Uuid) -> PortResult<Option<StoredTrip>> {
        let trips = self.trips.lock().await;
        Ok(trips
            .iter()
            .enumerate()
            .rev()
            .find(|(_, record)| record.session_id == session_id)
            .map(|(i, record)| StoredTrip {
                id: i as i64 + 1,
                record: record.clone(),
            }))
    }

    async fn update(&self, trip_id: i64, record: &TripRecord) -> PortResult<()> {
        let mut trips = self.trips.lock().await;
        let slot = usize::try_from(trip_id - 1)
            .ok()
            .and_then(|i| trips.get_mut(i))
            .ok_or_else(|| PortError::NotFound(format!("trip {}", trip_id)))?;
        *slot = record.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TripStatus;
    use crate::palette::ColorPalette;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Durable store that can be switched off, backed by memory while up.
    #[derive(Default)]
    struct FlakyStore {
        down: AtomicBool,
        inner: InMemoryStore,
    }

    impl FlakyStore {
        fn check(&self) -> PortResult<()> {
            if self.down.load(Ordering::SeqCst) {
                Err(PortError::Unexpected("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> PortResult<Option<String>> {
            self.check()?;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String, ttl: Duration) -> PortResult<()> {
            self.check()?;
            self.inner.set(key, value, ttl).await
        }

        async fn purge_expired(&self) -> PortResult<usize> {
            self.check()?;
            self.inner.purge_expired().await
        }
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn fallback_store_serves_writes_made_during_an_outage() {
        let durable = Arc::new(FlakyStore::default());
        let store = FallbackStore::new(durable.clone());

        store.set("job:1", "pending".into(), MINUTE).await.unwrap();
        durable.down.store(true, Ordering::SeqCst);
        assert_eq!(store.get("job:1").await.unwrap(), None);

        store.set("job:1", "running".into(), MINUTE).await.unwrap();
        assert_eq!(store.get("job:1").await.unwrap().as_deref(), Some("running"));

        // The durable copy is stale once it comes back; the local write wins.
        durable.down.store(false, Ordering::SeqCst);
        assert_eq!(store.get("job:1").await.unwrap().as_deref(), Some("running"));

        store.set("job:1", "done".into(), MINUTE).await.unwrap();
        assert_eq!(durable.inner.get("job:1").await.unwrap().as_deref(), Some("done"));
        assert_eq!(store.get("job:1").await.unwrap().as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn fallback_store_purges_locally_when_durable_sweep_fails() {
        let durable = Arc::new(FlakyStore::default());
        durable.down.store(true, Ordering::SeqCst);
        let store = FallbackStore::new(durable);

        store.set("a", "1".into(), Duration::ZERO).await.unwrap();
        assert_eq!(store.purge_expired().await.unwrap(), 1);
    }

    fn draft(session_id: Uuid, location: &str) -> TripRecord {
        let request: crate::request::TripRequest = serde_json::from_value(serde_json::json!({
            "location": location,
            "duration": 2,
            "photos": { "enabled": true }
        }))
        .unwrap();
        TripRecord::draft(&ReviewSession {
            id: session_id,
            parameters: request.validate().unwrap(),
            colors: ColorPalette::for_location(location),
            results: Default::default(),
            trip_id: None,
            created_at: chrono::Utc::now(),
        })
    }

    #[tokio::test]
    async fn trip_lookup_by_session_returns_the_newest_record() {
        let trips = InMemoryTripRepository::new();
        let session_id = Uuid::new_v4();
        trips.save_draft(&draft(session_id, "Lisbon")).await.unwrap();
        trips.save_draft(&draft(Uuid::new_v4(), "Porto")).await.unwrap();
        let newest = trips.save_draft(&draft(session_id, "Sintra")).await.unwrap();

        let found = trips.find_by_session(session_id).await.unwrap().unwrap();
        assert_eq!(found.id, newest);
        assert_eq!(found.record.parameters.location, "Sintra");
        assert_eq!(found.record.status, TripStatus::Draft);
    }

    #[tokio::test]
    async fn in_memory_store_expires_lazily_and_on_purge() {
        let store = InMemoryStore::new();
        store.set("a", "1".into(), Duration::ZERO).await.unwrap();
        store.set("b", "2".into(), Duration::ZERO).await.unwrap();
        store.set("c", "3".into(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.get("c").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn job_store_round_trips_and_misses_unknown_ids() {
        let jobs = JobStore::new(Arc::new(InMemoryStore::new()), Duration::from_secs(60));
        let mut job = Job::new();
        job.start("Scouting").unwrap();
        jobs.save(&job).await.unwrap();

        let loaded = jobs.load(job.id).await.unwrap().unwrap();
        assert_eq!(loaded, job);
        assert!(jobs.load(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_job_record_is_an_error() {
        let store = Arc::new(InMemoryStore::new());
        let id = Uuid::new_v4();
        store
            .set(&format!("job:{}", id), "not json".into(), Duration::from_secs(60))
            .await
            .unwrap();
        let jobs = JobStore::new(store, Duration::from_secs(60));
        assert!(jobs.load(id).await.is_err());
    }
}
