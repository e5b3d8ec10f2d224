//! crates/trip_scout_core/src/distance.rs
//!
//! Straight-line distance estimates between the accommodation and each venue.
//! These are approximations, never routing.

use crate::domain::ScoutItem;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Walking pace in metres per minute.
const WALK_SPEED_M_PER_MIN: f64 = 80.0;

/// Great-circle distance in metres.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Renders a distance as `~420 m · ~5 min walk`. Halves round to even.
pub fn format_distance(meters: f64) -> String {
    let walk_min = ((meters / WALK_SPEED_M_PER_MIN).round_ties_even() as i64).max(1);
    if meters < 150.0 {
        let rounded = (meters / 10.0).round_ties_even() as i64 * 10;
        format!("~{} m · ~{} min walk", rounded, walk_min)
    } else if meters < 1000.0 {
        let rounded = (meters / 50.0).round_ties_even() as i64 * 50;
        format!("~{} m · ~{} min walk", rounded, walk_min)
    } else {
        format!("~{:.1} km · ~{} min walk", meters / 1000.0, walk_min)
    }
}

/// Overwrites `travel_time` on every item with resolved coordinates.
/// Items without them keep the model's own estimate.
pub fn apply_distances(items: &mut [ScoutItem], origin_lat: f64, origin_lng: f64) {
    for item in items.iter_mut() {
        let venue = item.venue_mut();
        if let Some((lat, lng)) = venue.resolved_coordinates() {
            let meters = haversine_distance(origin_lat, origin_lng, lat, lng);
            venue.travel_time = Some(format_distance(meters));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScoutCategory;

    fn item(json: &str) -> ScoutItem {
        ScoutItem::from_model_json(ScoutCategory::Attractions, json).unwrap()
    }

    #[test]
    fn haversine_is_zero_for_same_point_and_symmetric() {
        assert!(haversine_distance(38.7, -9.1, 38.7, -9.1).abs() < 1e-6);
        let ab = haversine_distance(38.71, -9.14, 38.70, -9.15);
        let ba = haversine_distance(38.70, -9.15, 38.71, -9.14);
        assert!((ab - ba).abs() < 1e-6);
        // Roughly 1.4 km between these two Lisbon points.
        assert!(ab > 1300.0 && ab < 1500.0, "got {}", ab);
    }

    #[test]
    fn formats_each_band() {
        assert_eq!(format_distance(12.0), "~10 m · ~1 min walk");
        assert_eq!(format_distance(149.0), "~150 m · ~2 min walk");
        assert_eq!(format_distance(420.0), "~400 m · ~5 min walk");
        assert_eq!(format_distance(1430.0), "~1.4 km · ~18 min walk");
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(format_distance(125.0), "~120 m · ~2 min walk");
        assert_eq!(format_distance(135.0), "~140 m · ~2 min walk");
        assert_eq!(format_distance(200.0), "~200 m · ~2 min walk");
        assert_eq!(format_distance(225.0), "~200 m · ~3 min walk");
    }

    #[test]
    fn walk_minutes_never_below_one() {
        assert!(format_distance(0.0).ends_with("~1 min walk"));
    }

    #[test]
    fn rounded_magnitude_does_not_drop_across_bands() {
        fn magnitude_m(label: &str) -> f64 {
            let figure = label.trim_start_matches('~').split(' ').next().unwrap();
            let value: f64 = figure.parse().unwrap();
            if label.contains(" km ") {
                value * 1000.0
            } else {
                value
            }
        }

        let mut previous = 0.0;
        let mut meters = 0.0;
        while meters < 3000.0 {
            let current = magnitude_m(&format_distance(meters));
            assert!(current >= previous, "{} m went from {} to {}", meters, previous, current);
            previous = current;
            meters += 5.0;
        }
    }

    #[test]
    fn apply_distances_is_idempotent_and_skips_unresolved() {
        let mut items = vec![
            item(r#"{"name": "Castelo", "_lat": 38.71, "_lng": -9.14, "travel_time": "15 min metro"}"#),
            item(r#"{"name": "Somewhere", "travel_time": "10 min taxi"}"#),
        ];

        apply_distances(&mut items, 38.70, -9.15);
        let first = items[0].venue().travel_time.clone().unwrap();
        assert!(first.starts_with('~'));
        assert!(first.contains(" km ") || first.contains(" m "));
        assert!(first.contains("min walk"));
        assert_eq!(items[1].venue().travel_time.as_deref(), Some("10 min taxi"));

        apply_distances(&mut items, 38.70, -9.15);
        assert_eq!(items[0].venue().travel_time.as_deref(), Some(first.as_str()));
    }
}
