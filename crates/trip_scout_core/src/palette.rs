//! crates/trip_scout_core/src/palette.rs

use serde::{Deserialize, Serialize};

/// Guide colors, chosen from the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: String,
    pub accent: String,
    pub secondary: String,
    pub neutral: String,
}

impl ColorPalette {
    fn from_hex(primary: &str, accent: &str, secondary: &str, neutral: &str) -> Self {
        Self {
            primary: primary.to_string(),
            accent: accent.to_string(),
            secondary: secondary.to_string(),
            neutral: neutral.to_string(),
        }
    }

    /// Keyed by the lowercased city, i.e. the text before the first comma.
    pub fn for_location(location: &str) -> Self {
        let city = location
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match city.as_str() {
            "barcelona" => Self::from_hex("#c41e3a", "#f4a261", "#2a9d8f", "#f5e6d3"),
            "paris" => Self::from_hex("#1a1a2e", "#d4a574", "#16213e", "#f0e6d2"),
            "tokyo" => Self::from_hex("#8B0000", "#FFD700", "#1a1a1a", "#f5f5f5"),
            _ => Self::from_hex("#2c3e50", "#e67e22", "#34495e", "#ecf0f1"),
        }
    }
}
