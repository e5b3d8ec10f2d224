//! services/api/src/adapters/places.rs
//!
//! Text search against the Google Places API. Implements the `PlacesService` port.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use trip_scout_core::ports::{PlaceMatch, PlacesService, PortError, PortResult};

const SEARCH_URL: &str = "https://places.googleapis.com/v1/places:searchText";
const FIELD_MASK: &str =
    "places.id,places.displayName,places.businessStatus,places.googleMapsUri,places.location";

//=========================================================================================
// Wire records
//=========================================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    places: Vec<PlaceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceRecord {
    id: Option<String>,
    business_status: Option<String>,
    google_maps_uri: Option<String>,
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl PlaceRecord {
    fn to_domain(self) -> PlaceMatch {
        PlaceMatch {
            business_status: self.business_status,
            maps_url: self.google_maps_uri,
            place_id: self.id,
            lat: self.location.as_ref().map(|l| l.latitude),
            lng: self.location.as_ref().map(|l| l.longitude),
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct GooglePlacesAdapter {
    http: reqwest::Client,
    api_key: String,
}

impl GooglePlacesAdapter {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl PlacesService for GooglePlacesAdapter {
    /// Returns the first match, if any.
    async fn search(&self, query: &str) -> PortResult<Option<PlaceMatch>> {
        let response = self
            .http
            .post(SEARCH_URL)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&json!({ "textQuery": query, "maxResultCount": 1 }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("places request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "places search returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("places response unreadable: {}", e)))?;

        Ok(body.places.into_iter().next().map(PlaceRecord::to_domain))
    }
}
