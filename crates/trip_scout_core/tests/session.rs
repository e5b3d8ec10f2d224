mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use trip_scout_core::domain::{MealType, ScoutCategory, TripStatus};
use trip_scout_core::request::{SectionInput, TripRequest};
use trip_scout_core::{
    Approvals, PipelineError, PipelineOutcome, PipelineSettings, ReplaceRequest, TripRepository,
};
use uuid::Uuid;

const REPLACEMENT_CANDIDATES: &str = r#"{"day": 1, "meal_type": "lunch", "name": "Café Central", "address": "Rua Augusta 10"}
{"day": 1, "meal_type": "lunch", "name": "Tasca do Chico", "address": "Rua do Diário de Notícias 39"}
{"day": 1, "meal_type": "lunch", "name": "A Cevicheria", "address": "Rua Dom Pedro V 129"}"#;

fn guide_request() -> TripRequest {
    let section = SectionInput {
        enabled: true,
        per_day: Some(1),
        interests: None,
    };
    TripRequest {
        location: "Lisbon".into(),
        duration: 2,
        photos: section.clone(),
        restaurants: section.clone(),
        attractions: section,
        ..Default::default()
    }
}

fn full_model() -> ScriptedModel {
    ScriptedModel::new()
        .answer(ScoutCategory::Photos, PHOTO_LINES)
        .answer(ScoutCategory::Restaurants, DINING_LINES)
        .answer(ScoutCategory::Attractions, ATTRACTION_LINES)
}

async fn generated(h: &Harness) -> PipelineOutcome {
    let params = guide_request().validate().unwrap();
    h.orchestrator.generate(&params).await.unwrap()
}

fn names(items: &[trip_scout_core::ScoutItem]) -> Vec<&str> {
    items.iter().map(|i| i.name()).collect()
}

#[tokio::test]
async fn finalize_keeps_only_approved_indices() {
    let h = harness(full_model());
    let outcome = generated(&h).await;

    let approvals = Approvals {
        photos: Some(vec![1, 7, -1]),
        restaurants: Some(vec![]),
        attractions: None,
    };
    let guide = h
        .orchestrator
        .finalize(outcome.session_id, &approvals)
        .await
        .unwrap();

    assert_eq!(names(&guide.photos), vec!["Ponte 25 de Abril"]);
    assert!(guide.restaurants.is_empty());
    assert_eq!(guide.attraction_count, 2);
    assert_eq!(guide.trip_id, outcome.trip_id);
    // No places key configured, so no maps.
    assert!(guide.day_maps.is_empty());

    let trip = h
        .trips
        .find_by_session(outcome.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trip.record.status, TripStatus::Finalized);
    assert_eq!(trip.record.approved_photo_indices, Some(vec![1]));
    assert_eq!(trip.record.approved_restaurant_indices, Some(vec![]));
    assert_eq!(trip.record.approved_attraction_indices, Some(vec![0, 1]));
    assert_eq!(trip.record.raw_photos.len(), 2);
}

#[tokio::test]
async fn finalize_falls_back_to_the_trip_record_after_session_expiry() {
    let settings = PipelineSettings {
        session_ttl: Duration::ZERO,
        ..fast_settings()
    };
    let h = harness_with(full_model(), settings);
    let outcome = generated(&h).await;

    let guide = h
        .orchestrator
        .finalize(outcome.session_id, &Approvals::default())
        .await
        .unwrap();

    assert_eq!(guide.photo_count, 2);
    assert_eq!(guide.restaurant_count, 2);
    assert_eq!(guide.location, "Lisbon");
}

#[tokio::test]
async fn finalize_unknown_session_is_not_found() {
    let h = harness(full_model());
    let result = h
        .orchestrator
        .finalize(Uuid::new_v4(), &Approvals::default())
        .await;
    assert!(matches!(result, Err(PipelineError::SessionNotFound)));
}

#[tokio::test]
async fn replace_skips_excluded_names_and_updates_session_and_trip() {
    let h = harness(full_model());
    let outcome = generated(&h).await;
    h.model
        .respond(ScoutCategory::Restaurants, REPLACEMENT_CANDIDATES);

    let item = h
        .orchestrator
        .replace_item(ReplaceRequest {
            session_id: outcome.session_id,
            category: ScoutCategory::Restaurants,
            index: 0,
            day: 2,
            meal_type: Some(MealType::Lunch),
            exclude_names: vec!["Café Central".into(), "Tasca do Chico".into()],
        })
        .await
        .unwrap();

    assert_eq!(item.name(), "A Cevicheria");
    assert_eq!(item.day(), 2);

    let prompt = h.model.user_prompts(ScoutCategory::Restaurants).pop().unwrap();
    assert!(prompt.contains("  - Café Central"));
    assert!(prompt.contains("Day 2 of a 2-day trip."));

    let guide = h
        .orchestrator
        .finalize(outcome.session_id, &Approvals::default())
        .await
        .unwrap();
    assert_eq!(
        names(&guide.restaurants),
        vec!["A Cevicheria", "Taberna da Rua das Flores"]
    );

    let trip = h
        .trips
        .find_by_session(outcome.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trip.record.raw_restaurants[0].name(), "A Cevicheria");
}

#[tokio::test]
async fn replace_with_only_excluded_candidates_has_no_alternative() {
    let h = harness(full_model());
    let outcome = generated(&h).await;
    h.model.respond(
        ScoutCategory::Restaurants,
        r#"{"day": 1, "name": "Café Central"}"#,
    );

    let result = h
        .orchestrator
        .replace_item(ReplaceRequest {
            session_id: outcome.session_id,
            category: ScoutCategory::Restaurants,
            index: 1,
            day: 1,
            meal_type: Some(MealType::Dinner),
            exclude_names: vec!["Café Central".into()],
        })
        .await;

    assert!(matches!(result, Err(PipelineError::NoAlternative)));
    let trip = h
        .trips
        .find_by_session(outcome.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trip.record.raw_restaurants[1].name(), "Taberna da Rua das Flores");
}

#[tokio::test]
async fn closed_replacement_has_no_alternative() {
    let h = harness(full_model());
    let outcome = generated(&h).await;
    let places = ScriptedPlaces::new().with("Padrão", "CLOSED_PERMANENTLY", 38.69, -9.20);
    let orchestrator = h.orchestrator.clone().with_places(Arc::new(places));
    h.model
        .respond(ScoutCategory::Attractions, r#"{"day": 1, "name": "Padrão"}"#);

    let result = orchestrator
        .replace_item(ReplaceRequest {
            session_id: outcome.session_id,
            category: ScoutCategory::Attractions,
            index: 0,
            day: 1,
            meal_type: None,
            exclude_names: vec![],
        })
        .await;

    assert!(matches!(result, Err(PipelineError::NoAlternative)));
}

#[tokio::test]
async fn replace_out_of_range_index_returns_item_without_writing() {
    let h = harness(full_model());
    let outcome = generated(&h).await;
    h.model
        .respond(ScoutCategory::Photos, r#"{"day": 1, "name": "Elevador de Santa Justa"}"#);

    let item = h
        .orchestrator
        .replace_item(ReplaceRequest {
            session_id: outcome.session_id,
            category: ScoutCategory::Photos,
            index: 9,
            day: 1,
            meal_type: None,
            exclude_names: vec![],
        })
        .await
        .unwrap();

    assert_eq!(item.name(), "Elevador de Santa Justa");
    let guide = h
        .orchestrator
        .finalize(outcome.session_id, &Approvals::default())
        .await
        .unwrap();
    assert_eq!(
        names(&guide.photos),
        vec!["Miradouro da Senhora do Monte", "Ponte 25 de Abril"]
    );
}

#[tokio::test]
async fn replace_on_unknown_session_is_not_found() {
    let h = harness(full_model());
    let result = h
        .orchestrator
        .replace_item(ReplaceRequest {
            session_id: Uuid::new_v4(),
            category: ScoutCategory::Photos,
            index: 0,
            day: 1,
            meal_type: None,
            exclude_names: vec![],
        })
        .await;
    assert!(matches!(result, Err(PipelineError::SessionNotFound)));
    assert_eq!(h.model.calls_for(ScoutCategory::Photos), 0);
}
