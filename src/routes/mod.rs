//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/route", get(http::http_resolve_route))
        .route("/api/v1/weeks", get(http::http_list_weeks))
        .route("/api/v1/weeks/:week", get(http::http_get_week))
        .route("/api/v1/weeks/:week/exercises/:exercise", get(http::http_get_exercise))
        .route(
            "/api/v1/weeks/:week/exercises/:exercise/draft",
            put(http::http_put_draft).delete(http::http_delete_draft),
        )
        .route("/api/v1/weeks/:week/exercises/:exercise/draft/save", post(http::http_save_draft))
        .route("/api/v1/weeks/:week/exercises/:exercise/execute", post(http::http_execute))
        .route(
            "/api/v1/credential",
            get(http::http_get_credential)
                .put(http::http_put_credential)
                .delete(http::http_delete_credential),
        )
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
