//! crates/trip_scout_core/src/verify.rs
//!
//! Cross-checks generated venues against the places lookup.
//! Lookup failures never escape this module: they become `Unverified`.

use crate::domain::{ScoutItem, VenueStatus, Verification};
use crate::fanout::bounded_map;
use crate::ports::PlacesService;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);
pub const VERIFY_WORKERS: usize = 10;

/// Outcome of a batch verification.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub kept: Vec<ScoutItem>,
    pub removed: usize,
}

#[derive(Clone)]
pub struct VenueVerifier {
    places: Option<Arc<dyn PlacesService>>,
    timeout: Duration,
}

impl VenueVerifier {
    pub fn new(places: Option<Arc<dyn PlacesService>>) -> Self {
        Self {
            places,
            timeout: VERIFY_TIMEOUT,
        }
    }

    /// A verifier that marks everything unverified without any lookup.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.places.is_some()
    }

    /// Looks up one venue by "name, address, locality".
    pub async fn verify_one(&self, name: &str, address: &str, locality: &str) -> Verification {
        let Some(places) = &self.places else {
            return Verification::unverified();
        };

        let query = [name, address, locality]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        match tokio::time::timeout(self.timeout, places.search(&query)).await {
            Ok(Ok(Some(place))) => {
                let status = place
                    .business_status
                    .as_deref()
                    .map(VenueStatus::from_business_status)
                    .unwrap_or(VenueStatus::Unverified);
                info!(
                    "Places lookup: {:?} -> {:?} (place_id={:?})",
                    preview(&query),
                    status,
                    place.place_id
                );
                Verification {
                    status,
                    maps_url: place.maps_url,
                    place_id: place.place_id,
                    lat: place.lat,
                    lng: place.lng,
                }
            }
            Ok(Ok(None)) => {
                info!("Places lookup: no result for {:?}", preview(&query));
                Verification::unverified()
            }
            Ok(Err(e)) => {
                warn!("Places lookup failed for {:?}: {}", preview(&query), e);
                Verification::unverified()
            }
            Err(_) => {
                warn!(
                    "Places lookup timed out after {:?} for {:?}",
                    self.timeout,
                    preview(&query)
                );
                Verification::unverified()
            }
        }
    }

    /// Verifies every item concurrently, annotates the survivors, and drops
    /// anything reported closed (temporarily or permanently).
    pub async fn verify_batch(&self, items: Vec<ScoutItem>, locality: &str) -> BatchOutcome {
        if items.is_empty() {
            return BatchOutcome {
                kept: items,
                removed: 0,
            };
        }

        let total = items.len();
        let annotated = bounded_map(items, VERIFY_WORKERS, |mut item| async move {
            let verification = {
                let venue = item.venue();
                self.verify_one(&venue.name, &venue.address, locality).await
            };
            item.venue_mut().apply_verification(&verification);
            item
        })
        .await;

        let (kept, closed): (Vec<_>, Vec<_>) = annotated
            .into_iter()
            .partition(|item| !item.venue().status.is_some_and(|s| s.is_closed()));

        if !closed.is_empty() {
            let permanent = closed
                .iter()
                .filter(|i| i.venue().status == Some(VenueStatus::ClosedPermanently))
                .count();
            info!(
                "Places verification removed {} of {} candidates ({} permanently closed, {} temporarily closed)",
                closed.len(),
                total,
                permanent,
                closed.len() - permanent
            );
        }

        BatchOutcome {
            removed: closed.len(),
            kept,
        }
    }

    /// Resolves an address to coordinates. `None` on any failure.
    pub async fn geocode(&self, address: &str) -> Option<(f64, f64)> {
        let places = self.places.as_ref()?;
        if address.trim().is_empty() {
            return None;
        }
        match tokio::time::timeout(self.timeout, places.search(address)).await {
            Ok(Ok(Some(place))) => {
                let coords = place.lat.zip(place.lng);
                if let Some((lat, lng)) = coords {
                    info!("Accommodation geocoded: {:?} -> ({:.5}, {:.5})", preview(address), lat, lng);
                }
                coords
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!("Accommodation geocoding failed for {:?}: {}", preview(address), e);
                None
            }
            Err(_) => {
                warn!("Accommodation geocoding timed out for {:?}", preview(address));
                None
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(60).collect()
}
