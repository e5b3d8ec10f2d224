use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use trip_scout_core::ports::{PortResult, TextModelService};
use trip_scout_core::retry::RetryPolicy;
use trip_scout_core::store::{InMemoryStore, InMemoryTripRepository};
use trip_scout_core::{PipelineOrchestrator, PipelineSettings};

/// Answers photo prompts with two spots, dining prompts with one fixed
/// restaurant and everything else with prose.
struct CannedModel;

#[async_trait]
impl TextModelService for CannedModel {
    async fn complete(&self, system: &str, _user: &str, _max: u32) -> PortResult<String> {
        let text = if system.starts_with("You are a photography") {
            concat!(
                r#"{"day": 1, "name": "Miradouro de Santa Luzia", "address": "Largo Santa Luzia"}"#,
                "\n",
                r#"{"day": 1, "name": "Praça do Comércio", "address": "Baixa"}"#
            )
        } else if system.starts_with("You are a dining") {
            r#"{"day": 1, "meal_type": "lunch", "name": "Cervejaria Ramiro"}"#
        } else {
            "Nothing to suggest."
        };
        Ok(text.to_string())
    }
}

fn app() -> axum::Router {
    let settings = PipelineSettings {
        retry: RetryPolicy::new(1, Duration::ZERO),
        model_label: "Canned Model".to_string(),
        ..PipelineSettings::default()
    };
    let pipeline = PipelineOrchestrator::new(
        Arc::new(CannedModel),
        Arc::new(InMemoryStore::new()),
        Arc::new(InMemoryTripRepository::new()),
        settings,
    );
    router(Arc::new(AppState::new(pipeline)))
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn finished_job(app: &axum::Router, job_id: &str) -> Value {
    for _ in 0..500 {
        let (status, job) = send(app, "GET", &format!("/jobs/{}", job_id), None).await;
        assert_eq!(status, StatusCode::OK);
        if job["status"] == "done" || job["status"] == "failed" {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never finished", job_id);
}

fn lisbon_request() -> Value {
    json!({
        "location": "Lisbon, Portugal",
        "duration": 1,
        "photos": { "enabled": true, "per_day": 2 },
        "restaurants": { "enabled": true, "per_day": 1 }
    })
}

#[tokio::test]
async fn health_reports_model_label() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].as_str().unwrap().contains("Canned Model"));
}

#[tokio::test]
async fn invalid_generate_request_is_a_400_with_error_body() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/generate",
        Some(json!({ "location": "Lisbon", "duration": 0, "photos": { "enabled": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Duration"));

    let (status, body) = send(
        &app,
        "POST",
        "/generate",
        Some(json!({ "location": "Lisbon", "duration": "two" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_or_malformed_job_ids_are_404() {
    let app = app();
    let (status, body) = send(&app, "GET", &format!("/jobs/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job not found");

    let (status, _) = send(&app, "GET", "/jobs/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_poll_finalize_and_replace() {
    let app = app();

    let (status, accepted) = send(&app, "POST", "/generate", Some(lisbon_request())).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = accepted["job_id"].as_str().unwrap().to_string();

    let job = finished_job(&app, &job_id).await;
    assert_eq!(job["status"], "done", "{}", job);
    assert_eq!(job["progress"], 100);
    let result = &job["result"];
    assert_eq!(result["photo_count"], 2);
    assert_eq!(result["restaurant_count"], 1);
    assert_eq!(result["photos"][0]["_status"], "UNVERIFIED");
    let session_id = result["session_id"].as_str().unwrap().to_string();

    // The canned model only knows Cervejaria Ramiro, which is excluded.
    let (status, body) = send(
        &app,
        "POST",
        "/replace",
        Some(json!({
            "session_id": session_id,
            "type": "restaurants",
            "index": 0,
            "day": 1,
            "meal_type": "lunch",
            "exclude_names": ["Cervejaria Ramiro"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().starts_with("Could not find an alternative"));

    let (status, body) = send(
        &app,
        "POST",
        "/replace",
        Some(json!({
            "session_id": session_id,
            "type": "photos",
            "index": 1,
            "day": 1,
            "exclude_names": ["Praça do Comércio"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["name"], "Miradouro de Santa Luzia");

    let (status, guide) = send(
        &app,
        "POST",
        "/finalize",
        Some(json!({
            "session_id": session_id,
            "approved_photos": [1, 5],
            "approved_restaurants": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(guide["photo_count"], 1);
    assert_eq!(guide["restaurant_count"], 0);
    assert_eq!(guide["photos"][0]["name"], "Miradouro de Santa Luzia");
    assert_eq!(guide["day_maps"], json!([]));
}

#[tokio::test]
async fn finalize_and_replace_on_unknown_session_are_404() {
    let app = app();
    let session_id = uuid::Uuid::new_v4();

    let (status, body) = send(
        &app,
        "POST",
        "/finalize",
        Some(json!({ "session_id": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("Session expired"));

    let (status, _) = send(
        &app,
        "POST",
        "/replace",
        Some(json!({ "session_id": session_id, "type": "photos", "index": 0, "day": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/replace",
        Some(json!({ "session_id": session_id, "type": "photos", "index": -1, "day": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
