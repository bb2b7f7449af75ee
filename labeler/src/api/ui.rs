//! Embedded single-page UI.
//!
//! The client assets ship inside the binary so the labeler deploys as a
//! single file; there is no frontend build step.

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};

static INDEX_HTML: &str = include_str!("../../assets/index.html");
static APP_JS: &str = include_str!("../../assets/app.js");
static STYLE_CSS: &str = include_str!("../../assets/style.css");

pub async fn index_page() -> impl IntoResponse {
    Html(INDEX_HTML)
}

pub async fn app_js() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        APP_JS,
    )
}

pub async fn style_css() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLE_CSS,
    )
}
