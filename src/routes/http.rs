//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  body::Bytes,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{error, info, instrument};

use crate::error::{ShellError, StoreError};
use crate::logic::{self, LogicError};
use crate::protocol::*;
use crate::results::ResultsView;
use crate::route::{Resolved, Route, WEEK_NOT_FOUND};
use crate::state::AppState;

type HttpResult<T> = Result<Json<T>, (StatusCode, Json<ErrorOut>)>;

fn error_out(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorOut>) {
  (status, Json(ErrorOut { error: message.into() }))
}

fn store_failure(e: StoreError) -> (StatusCode, Json<ErrorOut>) {
  error!(target: "llm_course_backend", error = %e, "Storage failure");
  error_out(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Run a store-touching operation off the async workers; the file store writes synchronously.
async fn blocking<T, F>(op: F) -> HttpResult<T>
where
  T: Send + 'static,
  F: FnOnce() -> Result<T, LogicError> + Send + 'static,
{
  match tokio::task::spawn_blocking(op).await {
    Ok(res) => Ok(Json(res?)),
    Err(e) => {
      error!(target: "llm_course_backend", error = %e, "Blocking store task failed");
      Err(error_out(StatusCode::INTERNAL_SERVER_ERROR, "internal error"))
    }
  }
}

/// Empty body means "run the stored draft"; anything else must be a valid `ExecuteIn`.
fn parse_execute_body(body: &[u8]) -> Result<Option<String>, (StatusCode, Json<ErrorOut>)> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(None);
  }
  serde_json::from_slice::<ExecuteIn>(body)
    .map(|b| b.code)
    .map_err(|e| error_out(StatusCode::BAD_REQUEST, format!("Invalid execute body: {}", e)))
}

impl From<LogicError> for (StatusCode, Json<ErrorOut>) {
  fn from(e: LogicError) -> Self {
    match e {
      LogicError::NotFound(msg) => error_out(StatusCode::NOT_FOUND, msg),
      LogicError::Busy => error_out(StatusCode::CONFLICT, e.to_string()),
      LogicError::Store(e) => store_failure(e),
    }
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_weeks(State(state): State<Arc<AppState>>) -> Json<Vec<WeekSummaryOut>> {
  Json(week_summaries(&state.catalog))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_week(State(state): State<Arc<AppState>>, Path(week): Path<u32>) -> HttpResult<WeekOut> {
  let w = state
    .catalog
    .week(week)
    .ok_or_else(|| error_out(StatusCode::NOT_FOUND, WEEK_NOT_FOUND))?;
  Ok(Json(to_week_out(week, w)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_exercise(
  State(state): State<Arc<AppState>>,
  Path((week, exercise)): Path<(u32, usize)>,
) -> HttpResult<ExerciseOut> {
  let out = logic::exercise_view(&state, week, exercise)?;
  info!(target: "exercise", week, exercise, modified = out.modified, "HTTP exercise served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(code_len = body.code.len()))]
pub async fn http_put_draft(
  State(state): State<Arc<AppState>>,
  Path((week, exercise)): Path<(u32, usize)>,
  Json(body): Json<CodeIn>,
) -> HttpResult<DraftOut> {
  blocking(move || logic::edit_draft(&state, week, exercise, body.code)).await
}

#[instrument(level = "info", skip(state, body), fields(code_len = body.code.len()))]
pub async fn http_save_draft(
  State(state): State<Arc<AppState>>,
  Path((week, exercise)): Path<(u32, usize)>,
  Json(body): Json<CodeIn>,
) -> HttpResult<DraftOut> {
  blocking(move || logic::save_draft(&state, week, exercise, body.code)).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_draft(
  State(state): State<Arc<AppState>>,
  Path((week, exercise)): Path<(u32, usize)>,
) -> HttpResult<ExerciseOut> {
  blocking(move || logic::reset_draft(&state, week, exercise)).await
}

/// The body is optional; an empty POST (or `{}`) runs the stored draft.
#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_execute(
  State(state): State<Arc<AppState>>,
  Path((week, exercise)): Path<(u32, usize)>,
  body: Bytes,
) -> HttpResult<ResultsView> {
  let code = parse_execute_body(&body)?;
  let view = logic::execute_exercise(&state, week, exercise, code).await?;
  info!(target: "exercise", week, exercise, state = ?view.state, tokens = ?view.token_count, "HTTP execution finished");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_credential(State(state): State<Arc<AppState>>) -> Json<CredentialOut> {
  Json(CredentialOut { configured: state.credential().is_configured() })
}

#[instrument(level = "info", skip(state, body), fields(key_len = body.key.len()))]
pub async fn http_put_credential(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CredentialIn>,
) -> HttpResult<CredentialOut> {
  if body.key.trim().is_empty() {
    return Err(error_out(StatusCode::BAD_REQUEST, ShellError::BlankCredential.to_string()));
  }
  let out = blocking(move || {
    let mut cred = state.credential();
    cred.set(&body.key)?;
    Ok(CredentialOut { configured: cred.is_configured() })
  })
  .await?;
  info!(target: "llm_course_backend", "HTTP credential saved");
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_credential(State(state): State<Arc<AppState>>) -> HttpResult<CredentialOut> {
  let out = blocking(move || {
    state.credential().clear()?;
    Ok(CredentialOut { configured: false })
  })
  .await?;
  info!(target: "llm_course_backend", "HTTP credential cleared");
  Ok(out)
}

#[instrument(level = "info", skip(state), fields(path = %q.path))]
pub async fn http_resolve_route(State(state): State<Arc<AppState>>, Query(q): Query<RouteQuery>) -> Json<Resolved> {
  Json(Route::parse(&q.path).resolve(&state.catalog))
}
