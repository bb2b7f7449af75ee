//! Label persistence and export endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use shared_types::SaveLabelRequest;

use crate::api::ApiState;
use crate::store::labels::LabelDraft;

/// List every saved label, in save order.
pub async fn list_labels(State(state): State<ApiState>) -> impl IntoResponse {
    match state.app_state.labels().await.all() {
        Ok(labels) => (StatusCode::OK, Json(json!({ "labels": labels }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list labels");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Upsert the label for one trace. An empty feedback with no verdict is a
/// valid, explicit label.
pub async fn save_label(
    State(state): State<ApiState>,
    Json(req): Json<SaveLabelRequest>,
) -> impl IntoResponse {
    if req.filename.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "filename required" })),
        )
            .into_response();
    }

    let draft = LabelDraft {
        filename: req.filename,
        index: req.index,
        feedback: req.feedback,
        verdict: req.verdict,
    };

    match state.app_state.labels().await.upsert(draft) {
        Ok(record) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "record": record })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save label");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Download the full label set as a CSV attachment.
pub async fn export_csv(State(state): State<ApiState>) -> impl IntoResponse {
    match state.app_state.labels().await.export_csv() {
        Ok(body) => {
            let filename = format!(
                "labels_export_{}.csv",
                chrono::Utc::now().format("%Y%m%d_%H%M%S")
            );
            (
                StatusCode::OK,
                [
                    ("content-type", "text/csv; charset=utf-8".to_string()),
                    (
                        "content-disposition",
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to export labels");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
