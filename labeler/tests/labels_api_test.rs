//! Labels API Integration Tests
//!
//! Save/list/export cycles against a temp-backed label store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use labeler::api;
use labeler::app_state::AppState;
use labeler::store::labels::LabelStore;
use labeler::store::traces::TraceStore;

fn setup_app() -> (axum::Router, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let traces_dir = temp_dir.path().join("traces");
    std::fs::create_dir_all(&traces_dir).expect("Failed to create traces dir");

    let app_state = AppState::new(
        TraceStore::new(&traces_dir),
        LabelStore::new(temp_dir.path().join("labels.jsonl")),
    );
    let app = api::router().with_state(api::ApiState { app_state });
    (app, temp_dir)
}

async fn json_response(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value: Value = serde_json::from_slice(&body).expect("Invalid JSON response");
    (status, value)
}

async fn save(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/save")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    json_response(app, req).await
}

async fn list(app: &axum::Router) -> Vec<Value> {
    let req = Request::builder()
        .uri("/api/labels")
        .body(Body::empty())
        .unwrap();
    let (status, body) = json_response(app, req).await;
    assert_eq!(status, StatusCode::OK);
    body["labels"].as_array().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_save_then_list_round_trip() {
    let (app, _temp_dir) = setup_app();

    let before = Utc::now();
    let (status, body) = save(
        &app,
        json!({ "filename": "a.json", "index": 2, "feedback": "", "verdict": "down" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["record"]["filename"], "a.json");

    let labels = list(&app).await;
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0]["filename"], "a.json");
    assert_eq!(labels[0]["index"], 2);
    assert_eq!(labels[0]["verdict"], "down");
    assert_eq!(labels[0]["feedback"], "");

    let saved_at: DateTime<Utc> = labels[0]["saved_at"]
        .as_str()
        .unwrap()
        .parse()
        .expect("saved_at must be a timestamp");
    assert!(saved_at >= before - Duration::seconds(1));
    assert!(saved_at <= Utc::now() + Duration::seconds(1));
}

#[tokio::test]
async fn test_last_write_wins() {
    let (app, _temp_dir) = setup_app();

    save(
        &app,
        json!({ "filename": "a.json", "index": 0, "feedback": "looks great", "verdict": "up" }),
    )
    .await;
    save(
        &app,
        json!({ "filename": "a.json", "index": 0, "feedback": "changed my mind", "verdict": "down" }),
    )
    .await;

    let labels = list(&app).await;
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0]["verdict"], "down");
    assert_eq!(labels[0]["feedback"], "changed my mind");
}

#[tokio::test]
async fn test_save_without_filename_is_rejected() {
    let (app, _temp_dir) = setup_app();

    let (status, body) = save(&app, json!({ "filename": "", "feedback": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "filename required");

    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn test_empty_label_is_stored_explicitly() {
    let (app, _temp_dir) = setup_app();

    let (status, body) = save(
        &app,
        json!({ "filename": "a.json", "index": 0, "feedback": "", "verdict": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["record"]["verdict"].is_null());

    let labels = list(&app).await;
    assert_eq!(labels.len(), 1);
    assert!(labels[0]["verdict"].is_null());
    assert_eq!(labels[0]["feedback"], "");
}

#[tokio::test]
async fn test_unknown_verdict_becomes_none() {
    let (app, _temp_dir) = setup_app();

    let (status, _body) = save(
        &app,
        json!({ "filename": "a.json", "index": 0, "feedback": "", "verdict": "sideways" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let labels = list(&app).await;
    assert!(labels[0]["verdict"].is_null());
}

#[tokio::test]
async fn test_list_preserves_save_order_across_updates() {
    let (app, _temp_dir) = setup_app();

    save(&app, json!({ "filename": "a.json", "verdict": "up" })).await;
    save(&app, json!({ "filename": "b.json", "verdict": "down" })).await;
    save(&app, json!({ "filename": "a.json", "verdict": "down", "feedback": "revised" })).await;

    let labels = list(&app).await;
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0]["filename"], "a.json");
    assert_eq!(labels[0]["feedback"], "revised");
    assert_eq!(labels[1]["filename"], "b.json");
}

#[tokio::test]
async fn test_export_csv_download() {
    let (app, _temp_dir) = setup_app();

    save(
        &app,
        json!({ "filename": "a.json", "index": 1, "feedback": "clear, concise", "verdict": "up" }),
    )
    .await;

    let req = Request::builder()
        .uri("/api/export")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"labels_export_"));
    assert!(disposition.ends_with(".csv\""));

    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = text.split("\r\n");
    assert_eq!(lines.next(), Some("filename,index,verdict,feedback,saved_at"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("a.json,1,up,\"clear, concise\","));
}
