//! LLM Course Backend
//!
//! - Axum HTTP + WebSocket API over a week/exercise catalog of code samples
//! - Drafts and the OpenAI API key kept in a key/value store (memory or JSON file)
//! - Simulated execution: API-call lines become real chat completions
//! - Static SPA fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   STATIC_DIR         : default "./static"
//!   COURSE_STORE_PATH  : JSON file for drafts + key; memory only when unset
//!   COURSE_CONFIG_PATH : path to TOML config (execution settings + extra weeks)
//!   OPENAI_BASE_URL    : overrides the endpoint with "<base>/chat/completions"
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod seeds;
mod catalog;
mod storage;
mod drafts;
mod credential;
mod scan;
mod openai;
mod executor;
mod results;
mod editor;
mod route;
mod shell;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: catalog, store, OpenAI client.
  let state = Arc::new(AppState::from_env()?);

  let static_dir = std::env::var("STATIC_DIR")
    .ok()
    .filter(|s| !s.trim().is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("./static"));
  info!(target: "llm_course_backend", static_dir = %static_dir.display(), "Serving static files");

  let app = build_router(state, static_dir);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "llm_course_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
