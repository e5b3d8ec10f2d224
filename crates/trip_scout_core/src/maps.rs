//! crates/trip_scout_core/src/maps.rs
//!
//! Per-day static maps for finalized guides.

use crate::domain::{DayMap, ScoutCategory, ScoutItem};
use crate::fanout::bounded_map;
use crate::ports::MapImageService;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use url::form_urlencoded;

/// The only host map images are ever fetched from.
pub const TRUSTED_MAP_PREFIX: &str = "https://maps.googleapis.com/";
pub const MAP_FETCH_TIMEOUT: Duration = Duration::from_secs(8);
pub const MAP_PREFETCH_WORKERS: usize = 8;

const STATIC_MAP_BASE: &str = "https://maps.googleapis.com/maps/api/staticmap?";
const DEEP_LINK_BASE: &str = "https://www.google.com/maps/search/?";
const MARKER_LABELS: &[u8] = b"123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// URLs for one day's map. Built without any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMapUrls {
    pub image_url: String,
    pub maps_link: String,
}

fn marker_label(index: usize) -> char {
    MARKER_LABELS.get(index).map(|&b| b as char).unwrap_or('X')
}

fn zoom_for(pins: usize) -> u8 {
    match pins {
        1 => 15,
        2..=3 => 14,
        _ => 13,
    }
}

/// Builds the static map and deep link for a day's items.
/// Returns `None` when no item has resolved coordinates.
pub fn build_static_map(api_key: &str, items: &[&ScoutItem]) -> Option<StaticMapUrls> {
    let pins: Vec<(f64, f64)> = items
        .iter()
        .filter_map(|item| item.venue().resolved_coordinates())
        .collect();
    if pins.is_empty() {
        return None;
    }

    let zoom = zoom_for(pins.len()).to_string();
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("size", "900x380")
        .append_pair("scale", "2")
        .append_pair("zoom", &zoom)
        .append_pair("key", api_key);
    for (i, (lat, lng)) in pins.iter().enumerate() {
        let marker = format!("color:red|label:{}|{},{}", marker_label(i), lat, lng);
        query.append_pair("markers", &marker);
    }

    let all_coords = pins
        .iter()
        .map(|(lat, lng)| format!("{},{}", lat, lng))
        .collect::<Vec<_>>()
        .join("|");
    let link_query = form_urlencoded::Serializer::new(String::new())
        .append_pair("api", "1")
        .append_pair("query", &all_coords)
        .finish();

    Some(StaticMapUrls {
        image_url: format!("{}{}", STATIC_MAP_BASE, query.finish()),
        maps_link: format!("{}{}", DEEP_LINK_BASE, link_query),
    })
}

/// Groups items by day, keeping their relative order.
pub fn group_by_day(items: &[ScoutItem]) -> BTreeMap<u32, Vec<&ScoutItem>> {
    let mut days: BTreeMap<u32, Vec<&ScoutItem>> = BTreeMap::new();
    for item in items {
        days.entry(item.day()).or_default().push(item);
    }
    days
}

/// Builds and fetches day maps through a guarded image fetcher.
#[derive(Clone)]
pub struct DayMapper {
    api_key: String,
    fetcher: Arc<dyn MapImageService>,
    timeout: Duration,
}

impl DayMapper {
    pub fn new(api_key: impl Into<String>, fetcher: Arc<dyn MapImageService>) -> Self {
        Self {
            api_key: api_key.into(),
            fetcher,
            timeout: MAP_FETCH_TIMEOUT,
        }
    }

    /// Fetches an image as a `data:` URI. Any URL outside the trusted prefix is
    /// refused before a request is made. Failures yield `None`.
    pub async fn fetch_data_uri(&self, url: &str) -> Option<String> {
        if !url.starts_with(TRUSTED_MAP_PREFIX) {
            error!(
                "Blocked map fetch to untrusted URL: {}",
                url.chars().take(80).collect::<String>()
            );
            return None;
        }
        match tokio::time::timeout(self.timeout, self.fetcher.fetch(url)).await {
            Ok(Ok(image)) => {
                let mime = image
                    .content_type
                    .split(';')
                    .next()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .unwrap_or("image/png");
                Some(format!("data:{};base64,{}", mime, STANDARD.encode(&image.bytes)))
            }
            Ok(Err(e)) => {
                warn!("Static map fetch failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Static map fetch timed out after {:?}", self.timeout);
                None
            }
        }
    }

    /// Builds one map per (category, day) with pinned items and fetches all
    /// images concurrently.
    pub async fn prefetch(&self, sections: &[(ScoutCategory, &[ScoutItem])]) -> Vec<DayMap> {
        let mut planned = Vec::new();
        for (category, items) in sections {
            for (day, day_items) in group_by_day(items) {
                let Some(urls) = build_static_map(&self.api_key, &day_items) else {
                    continue;
                };
                let names: Vec<String> = day_items
                    .iter()
                    .map(|item| item.name().to_string())
                    .filter(|name| !name.is_empty())
                    .collect();
                planned.push((*category, day, urls, names));
            }
        }
        if planned.is_empty() {
            return Vec::new();
        }

        let total = planned.len();
        let maps = bounded_map(
            planned,
            MAP_PREFETCH_WORKERS,
            |(category, day, urls, names)| async move {
                DayMap {
                    category,
                    day,
                    image: self.fetch_data_uri(&urls.image_url).await,
                    maps_link: urls.maps_link,
                    names,
                }
            },
        )
        .await;

        let fetched = maps.iter().filter(|m| m.image.is_some()).count();
        info!("Prefetched {}/{} day map images", fetched, total);
        maps
    }
}
