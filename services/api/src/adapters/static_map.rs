//! services/api/src/adapters/static_map.rs
//!
//! Downloads static map images. The trusted-prefix guard lives in the core
//! `DayMapper`; this adapter only performs the request.

use async_trait::async_trait;
use trip_scout_core::ports::{MapImage, MapImageService, PortError, PortResult};

#[derive(Clone)]
pub struct HttpMapImageAdapter {
    http: reqwest::Client,
}

impl HttpMapImageAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MapImageService for HttpMapImageAdapter {
    async fn fetch(&self, url: &str) -> PortResult<MapImage> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("map request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "map request returned status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Unexpected(format!("map body unreadable: {}", e.without_url())))?;

        Ok(MapImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
