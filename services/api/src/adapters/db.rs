//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter. It backs three core ports with
//! PostgreSQL through `sqlx`: the shared key-value store, the durable trip
//! repository and the traveller profile lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::time::Duration;
use trip_scout_core::domain::{StoredTrip, TripStatus};
use trip_scout_core::ports::{
    KeyValueStore, PortError, PortResult, ProfileService, TripRepository,
};
use trip_scout_core::{TravellerProfile, TripRecord};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn status_label(status: TripStatus) -> &'static str {
    match status {
        TripStatus::Draft => "draft",
        TripStatus::Finalized => "finalized",
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct TripRow {
    id: i64,
    document: String,
}

impl TripRow {
    fn to_domain(self) -> PortResult<StoredTrip> {
        let record: TripRecord = serde_json::from_str(&self.document).map_err(|e| {
            PortError::Unexpected(format!("trip {} has an unreadable document: {}", self.id, e))
        })?;
        Ok(StoredTrip {
            id: self.id,
            record,
        })
    }
}

#[derive(FromRow)]
struct ClientRow {
    home_city: Option<String>,
    preferred_budget: Option<String>,
    travel_style: Option<String>,
    dietary_requirements: Option<String>,
    notes: Option<String>,
}

impl ClientRow {
    fn to_domain(self) -> TravellerProfile {
        TravellerProfile {
            home_city: self.home_city,
            preferred_budget: self.preferred_budget,
            travel_style: self.travel_style,
            dietary_requirements: self.dietary_requirements,
            notes: self.notes,
        }
    }
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for DbAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_entries WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> PortResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| PortError::Unexpected(format!("ttl out of range: {}", e)))?;
        let expires_at: DateTime<Utc> = Utc::now() + ttl;
        sqlx::query(
            "INSERT INTO kv_entries (key, value, expires_at) VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn purge_expired(&self) -> PortResult<usize> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() as usize)
    }
}

//=========================================================================================
// `TripRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl TripRepository for DbAdapter {
    async fn save_draft(&self, record: &TripRecord) -> PortResult<i64> {
        let document =
            serde_json::to_string(record).map_err(|e| PortError::Unexpected(e.to_string()))?;
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO trips (session_id, client_id, status, title, document)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(record.session_id)
        .bind(record.client_id)
        .bind(status_label(record.status))
        .bind(&record.title)
        .bind(document)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn find_by_session(&self, session_id: Uuid) -> PortResult<Option<StoredTrip>> {
        let row = sqlx::query_as::<_, TripRow>(
            "SELECT id, document FROM trips WHERE session_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        row.map(TripRow::to_domain).transpose()
    }

    async fn update(&self, trip_id: i64, record: &TripRecord) -> PortResult<()> {
        let document =
            serde_json::to_string(record).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let result = sqlx::query(
            "UPDATE trips SET status = $1, document = $2, updated_at = now() WHERE id = $3",
        )
        .bind(status_label(record.status))
        .bind(document)
        .bind(trip_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Trip {} not found", trip_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `ProfileService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileService for DbAdapter {
    async fn get_profile(&self, client_id: i64) -> PortResult<Option<TravellerProfile>> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT home_city, preferred_budget, travel_style, dietary_requirements, notes
             FROM clients WHERE id = $1 AND NOT is_deleted",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.map(ClientRow::to_domain))
    }
}
