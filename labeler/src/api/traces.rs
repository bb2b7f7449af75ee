//! Trace read endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use shared_types::Label;

use crate::api::ApiState;
use crate::markdown;
use crate::store::traces::TraceStoreError;

#[derive(Debug, Serialize)]
pub struct TraceResponse {
    pub filename: String,
    pub index: usize,
    pub total: usize,
    pub initial_query: String,
    pub assistant_output: String,
    /// Normalized, rendered, sanitized response — what the page inserts.
    pub assistant_html: String,
    pub existing_label: Option<Label>,
}

/// Serve the trace at `index`, clamped into the known range, together with
/// its current label if one exists.
pub async fn get_trace(
    State(state): State<ApiState>,
    Path(index): Path<i64>,
) -> impl IntoResponse {
    let loaded = match state.app_state.traces().load_at(index) {
        Ok(loaded) => loaded,
        Err(TraceStoreError::Empty(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "No traces found" })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, index, "Failed to load trace");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let existing_label = match state.app_state.labels().await.find(&loaded.trace.filename) {
        Ok(label) => label,
        Err(e) => {
            // The trace itself is fine; serve it without the label rather
            // than failing the whole view.
            tracing::warn!(error = %e, "Failed to read label store");
            None
        }
    };

    let assistant_html = markdown::render_response(&loaded.trace.assistant_output);

    (
        StatusCode::OK,
        Json(TraceResponse {
            filename: loaded.trace.filename,
            index: loaded.index,
            total: loaded.total,
            initial_query: loaded.trace.initial_query,
            assistant_output: loaded.trace.assistant_output,
            assistant_html,
            existing_label,
        }),
    )
        .into_response()
}
