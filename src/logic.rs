//! Core behaviours behind the stateless HTTP endpoints.
//!
//! Each request reads the persisted draft/credential afresh, so HTTP clients see
//! the same storage the WebSocket shells write to (last writer wins).
//!   - Exercise view (draft or initial code)
//!   - Edit (auto-save rule), Save (unconditional), Reset (clear draft)
//!   - Execute with the stored credential, one run per exercise at a time

use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::{Exercise, Week};
use crate::editor::EditorSurface;
use crate::error::StoreError;
use crate::executor;
use crate::protocol::{to_exercise_out, DraftOut, ExerciseOut};
use crate::results::{render, ReportContext, ResultsView};
use crate::route::{EXERCISE_NOT_FOUND, WEEK_NOT_FOUND};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum LogicError {
  #[error("{0}")]
  NotFound(&'static str),

  #[error("an execution is already running for this exercise")]
  Busy,

  #[error(transparent)]
  Store(#[from] StoreError),
}

fn lookup(state: &AppState, week: u32, exercise: usize) -> Result<(&Week, &Exercise), LogicError> {
  let w = state.catalog.week(week).ok_or(LogicError::NotFound(WEEK_NOT_FOUND))?;
  let e = w.exercise(exercise).ok_or(LogicError::NotFound(EXERCISE_NOT_FOUND))?;
  Ok((w, e))
}

fn editor_for(state: &AppState, week: u32, exercise: usize, e: &Exercise) -> EditorSurface {
  EditorSurface::open(&e.initial_source, state.drafts().load(week, exercise))
}

pub fn exercise_view(state: &AppState, week: u32, exercise: usize) -> Result<ExerciseOut, LogicError> {
  let (w, e) = lookup(state, week, exercise)?;
  let editor = editor_for(state, week, exercise, e);
  Ok(to_exercise_out(week, w, exercise, e, editor.text()))
}

#[instrument(level = "info", skip(state, code), fields(code_len = code.len()))]
pub fn edit_draft(state: &AppState, week: u32, exercise: usize, code: String) -> Result<DraftOut, LogicError> {
  let (_, e) = lookup(state, week, exercise)?;
  let saved = state.drafts().autosave(week, exercise, &code, &e.initial_source)?;
  let modified = code != e.initial_source;
  Ok(DraftOut { code, modified, saved })
}

#[instrument(level = "info", skip(state, code), fields(code_len = code.len()))]
pub fn save_draft(state: &AppState, week: u32, exercise: usize, code: String) -> Result<DraftOut, LogicError> {
  let (_, e) = lookup(state, week, exercise)?;
  state.drafts().save(week, exercise, &code)?;
  info!(target: "exercise", week, exercise, "Draft saved");
  let modified = code != e.initial_source;
  Ok(DraftOut { code, modified, saved: true })
}

#[instrument(level = "info", skip(state))]
pub fn reset_draft(state: &AppState, week: u32, exercise: usize) -> Result<ExerciseOut, LogicError> {
  let (w, e) = lookup(state, week, exercise)?;
  state.drafts().clear(week, exercise)?;
  info!(target: "exercise", week, exercise, "Draft reset");
  Ok(to_exercise_out(week, w, exercise, e, &e.initial_source))
}

/// Run `code`, or the current draft/initial source when None.
#[instrument(level = "info", skip(state, code), fields(explicit_code = code.is_some()))]
pub async fn execute_exercise(
  state: &AppState,
  week: u32,
  exercise: usize,
  code: Option<String>,
) -> Result<ResultsView, LogicError> {
  let (_, e) = lookup(state, week, exercise)?;
  let source = match code {
    Some(c) => c,
    None => editor_for(state, week, exercise, e).text().to_string(),
  };
  let _guard = state.try_begin_execution(week, exercise).ok_or(LogicError::Busy)?;

  let credential = state.credential();
  let outcome = executor::execute(&state.openai, &state.settings, &source, credential.get()).await;
  let ctx = ReportContext { week, exercise, title: &e.title };
  Ok(render(Some(&outcome), ctx))
}
