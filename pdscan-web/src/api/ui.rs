//! UI serving routes
//!
//! Serves the single-page screening UI and its script

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const APP_JS: &str = include_str!("../../static/app.js");

/// Footer line identifying the running build
pub fn build_info_line() -> String {
    format!(
        "pdscan-web v{} ({}, {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    )
}

/// GET /
///
/// Serves the main UI page with build identification in the footer
pub async fn serve_index() -> Html<String> {
    Html(INDEX_HTML.replace("{{BUILD_INFO}}", &build_info_line()))
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        APP_JS,
    )
        .into_response()
}

pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/static/app.js", get(serve_app_js))
}
