//! HTTP API routes for the trace labeler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

pub mod labels;
pub mod traces;
pub mod ui;

use crate::app_state::AppState;

#[derive(Clone)]
pub struct ApiState {
    pub app_state: AppState,
}

/// Configure all API routes
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(ui::index_page))
        .route("/static/app.js", get(ui::app_js))
        .route("/static/style.css", get(ui::style_css))
        .route("/health", get(health_check))
        // Trace routes
        .route("/api/trace/{index}", get(traces::get_trace))
        // Label routes
        .route("/api/labels", get(labels::list_labels))
        .route("/api/save", post(labels::save_label))
        .route("/api/export", get(labels::export_csv))
}

/// Health check endpoint
pub async fn health_check(State(_state): State<ApiState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "trace-labeler",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
