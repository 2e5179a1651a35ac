//! Page Shell: the state container behind one viewer (one WebSocket connection).
//!
//! It owns the credential, the draft store handle and the current view, and
//! applies the transitions: navigate, open exercise, edit, save, reset, execute,
//! plus the credential dialog overlay that never touches the exercise state.
//!
//! Execution is split in two so the network call can run off the message loop:
//! `begin_execute` flips the outcome to Pending and hands out a job, and
//! `finish_execute` applies the result only if that job is still the live one.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::credential::CredentialStore;
use crate::domain::{Exercise, ExecutionOutcome};
use crate::drafts::DraftStore;
use crate::editor::{EditorStatus, EditorSurface};
use crate::error::ShellError;
use crate::results::{render, ReportContext, ResultsView};
use crate::route::{Resolved, Route};
use crate::storage::KeyValueStore;

pub struct ExerciseView {
  pub week: u32,
  pub exercise: usize,
  pub editor: EditorSurface,
  pub outcome: Option<ExecutionOutcome>,
  /// Id of the execution whose result may still land here.
  live_job: Option<u64>,
}

pub enum View {
  /// Home, a week listing, or a not-found page.
  Browsing(Resolved),
  ExerciseActive(ExerciseView),
}

/// Everything a detached execution needs.
#[derive(Clone, Debug)]
pub struct ExecutionJob {
  pub id: u64,
  pub week: u32,
  pub exercise: usize,
  pub source: String,
  pub credential: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
  pub configured: bool,
  pub dialog_open: bool,
}

pub struct PageShell {
  catalog: Arc<Catalog>,
  drafts: DraftStore,
  credential: CredentialStore,
  dialog_open: bool,
  view: View,
  next_job: u64,
}

impl PageShell {
  pub fn new(catalog: Arc<Catalog>, store: Arc<dyn KeyValueStore>) -> Self {
    Self {
      catalog,
      drafts: DraftStore::new(store.clone()),
      credential: CredentialStore::load(store),
      dialog_open: false,
      view: View::Browsing(Resolved::Home),
      next_job: 1,
    }
  }

  pub fn view(&self) -> &View {
    &self.view
  }

  pub fn active(&self) -> Option<&ExerciseView> {
    match &self.view {
      View::ExerciseActive(v) => Some(v),
      View::Browsing(_) => None,
    }
  }

  fn active_mut(&mut self) -> Result<&mut ExerciseView, ShellError> {
    match &mut self.view {
      View::ExerciseActive(v) => Ok(v),
      View::Browsing(_) => Err(ShellError::NoActiveExercise),
    }
  }

  /// Exercise content of the active view.
  pub fn active_exercise(&self) -> Option<&Exercise> {
    self.active().and_then(|v| self.catalog.exercise(v.week, v.exercise))
  }

  /// Follow a SPA path; exercise routes open the exercise.
  #[instrument(level = "info", skip(self))]
  pub fn navigate(&mut self, path: &str) -> &View {
    match Route::parse(path).resolve(&self.catalog) {
      Resolved::Exercise { week, exercise } => {
        // Resolution already proved the exercise exists.
        let _ = self.open_exercise(week, exercise);
      }
      other => {
        debug!(target: "exercise", ?other, "Browsing");
        self.view = View::Browsing(other);
      }
    }
    &self.view
  }

  /// Select an exercise: editor seeded from the draft (or initial source), no outcome.
  #[instrument(level = "info", skip(self))]
  pub fn open_exercise(&mut self, week: u32, exercise: usize) -> Option<&ExerciseView> {
    let Some(ex) = self.catalog.exercise(week, exercise) else {
      warn!(target: "exercise", week, exercise, "Unknown exercise requested");
      self.view = View::Browsing(Resolved::NotFound { message: crate::route::EXERCISE_NOT_FOUND.into() });
      return None;
    };
    let draft = self.drafts.load(week, exercise);
    let editor = EditorSurface::open(&ex.initial_source, draft);
    info!(target: "exercise", week, exercise, modified = editor.is_modified(), "Exercise opened");
    self.view = View::ExerciseActive(ExerciseView { week, exercise, editor, outcome: None, live_job: None });
    self.active()
  }

  /// Replace the editor text and auto-save it when it differs from the seed.
  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  pub fn edit(&mut self, text: String) -> Result<EditorStatus, ShellError> {
    let drafts = self.drafts.clone();
    let view = self.active_mut()?;
    let status = view.editor.set_text(text);
    drafts.autosave(view.week, view.exercise, view.editor.text(), view.editor.initial())?;
    Ok(status)
  }

  /// Explicit save, written even when the text equals the seed.
  #[instrument(level = "info", skip(self))]
  pub fn save(&mut self) -> Result<(), ShellError> {
    let drafts = self.drafts.clone();
    let view = self.active_mut()?;
    drafts.save(view.week, view.exercise, view.editor.text())?;
    info!(target: "exercise", week = view.week, exercise = view.exercise, "Draft saved");
    Ok(())
  }

  /// Back to the seed: draft removed, outcome cleared, pending results ignored.
  #[instrument(level = "info", skip(self))]
  pub fn reset(&mut self) -> Result<EditorStatus, ShellError> {
    let drafts = self.drafts.clone();
    let view = self.active_mut()?;
    drafts.clear(view.week, view.exercise)?;
    view.outcome = None;
    view.live_job = None;
    info!(target: "exercise", week = view.week, exercise = view.exercise, "Draft reset");
    Ok(view.editor.reset())
  }

  /// Enter Pending and hand out the job to run. Refused while pending or without a key.
  #[instrument(level = "info", skip(self))]
  pub fn begin_execute(&mut self) -> Result<ExecutionJob, ShellError> {
    let credential = self.credential.get().to_string();
    let id = self.next_job;
    let view = self.active_mut()?;
    if view.outcome.as_ref().is_some_and(ExecutionOutcome::is_pending) {
      return Err(ShellError::ExecutionPending);
    }
    if credential.is_empty() {
      return Err(ShellError::MissingCredential);
    }

    view.outcome = Some(ExecutionOutcome::Pending);
    view.live_job = Some(id);
    let job = ExecutionJob {
      id,
      week: view.week,
      exercise: view.exercise,
      source: view.editor.text().to_string(),
      credential,
    };
    self.next_job += 1;
    info!(target: "exercise", job = id, week = job.week, exercise = job.exercise, "Execution started");
    Ok(job)
  }

  /// True when the result was applied; stale jobs (navigation, reset) are dropped.
  #[instrument(level = "info", skip(self, outcome))]
  pub fn finish_execute(&mut self, job_id: u64, outcome: ExecutionOutcome) -> bool {
    match &mut self.view {
      View::ExerciseActive(v) if v.live_job == Some(job_id) => {
        v.live_job = None;
        v.outcome = Some(outcome);
        true
      }
      _ => {
        debug!(target: "exercise", job = job_id, "Discarding result of a stale execution");
        false
      }
    }
  }

  pub fn results(&self) -> Option<ResultsView> {
    let view = self.active()?;
    let title = self.active_exercise().map(|e| e.title.as_str()).unwrap_or_default();
    let ctx = ReportContext { week: view.week, exercise: view.exercise, title };
    Some(render(view.outcome.as_ref(), ctx))
  }

  // --- credential dialog (overlay; exercise state is untouched) ---

  pub fn open_credential_dialog(&mut self) -> CredentialStatus {
    self.dialog_open = true;
    self.credential_status()
  }

  pub fn close_credential_dialog(&mut self) -> CredentialStatus {
    self.dialog_open = false;
    self.credential_status()
  }

  /// Dialog "Save": blank input is refused and leaves the dialog open.
  pub fn save_credential(&mut self, input: &str) -> Result<CredentialStatus, ShellError> {
    if input.trim().is_empty() {
      return Err(ShellError::BlankCredential);
    }
    self.credential.set(input)?;
    Ok(self.close_credential_dialog())
  }

  pub fn clear_credential(&mut self) -> Result<CredentialStatus, ShellError> {
    self.credential.clear()?;
    Ok(self.close_credential_dialog())
  }

  pub fn credential_status(&self) -> CredentialStatus {
    CredentialStatus { configured: self.credential.is_configured(), dialog_open: self.dialog_open }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ExecutionSettings;
  use crate::drafts::draft_key;
  use crate::executor::{self, tests::FakeTransport};
  use crate::storage::MemoryStore;

  fn shell() -> (Arc<MemoryStore>, PageShell) {
    let mem = Arc::new(MemoryStore::new());
    (mem.clone(), PageShell::new(Arc::new(Catalog::default()), mem))
  }

  fn initial(week: u32, exercise: usize) -> String {
    Catalog::default().exercise(week, exercise).unwrap().initial_source.clone()
  }

  #[test]
  fn opening_uses_saved_draft_or_seed() {
    let (mem, mut s) = shell();
    assert_eq!(s.open_exercise(2, 1).unwrap().editor.text(), initial(2, 1));

    mem.set(&draft_key(2, 1), "print('mine')").unwrap();
    let v = s.open_exercise(2, 1).unwrap();
    assert_eq!(v.editor.text(), "print('mine')");
    assert!(v.outcome.is_none());
  }

  #[test]
  fn edit_autosaves_only_modified_text() {
    let (mem, mut s) = shell();
    s.open_exercise(1, 2);
    let st = s.edit(initial(1, 2)).unwrap();
    assert!(!st.modified);
    assert_eq!(mem.get(&draft_key(1, 2)), None);

    let st = s.edit("print('changed')".into()).unwrap();
    assert!(st.modified);
    assert_eq!(mem.get(&draft_key(1, 2)).as_deref(), Some("print('changed')"));
  }

  #[test]
  fn explicit_save_bypasses_modified_gate() {
    let (mem, mut s) = shell();
    s.open_exercise(3, 1);
    s.save().unwrap();
    assert_eq!(mem.get(&draft_key(3, 1)), Some(initial(3, 1)));
  }

  #[test]
  fn reset_restores_seed_and_clears_draft() {
    let (mem, mut s) = shell();
    s.open_exercise(2, 1);
    s.edit("print('x')".into()).unwrap();
    assert!(mem.get(&draft_key(2, 1)).is_some());

    let st = s.reset().unwrap();
    assert!(!st.modified);
    assert_eq!(s.active().unwrap().editor.text(), initial(2, 1));
    assert_eq!(mem.get(&draft_key(2, 1)), None);
  }

  #[test]
  fn actions_without_exercise_are_rejected() {
    let (_, mut s) = shell();
    assert!(matches!(s.edit("x".into()), Err(ShellError::NoActiveExercise)));
    assert!(matches!(s.save(), Err(ShellError::NoActiveExercise)));
    assert!(matches!(s.begin_execute(), Err(ShellError::NoActiveExercise)));
  }

  #[test]
  fn execute_needs_credential_and_no_pending_run() {
    let (_, mut s) = shell();
    s.open_exercise(1, 1);
    assert!(matches!(s.begin_execute(), Err(ShellError::MissingCredential)));
    assert!(s.active().unwrap().outcome.is_none());

    s.save_credential("sk-test").unwrap();
    let job = s.begin_execute().unwrap();
    assert_eq!(job.credential, "sk-test");
    assert_eq!(job.source, initial(1, 1));
    assert_eq!(s.active().unwrap().outcome, Some(ExecutionOutcome::Pending));
    assert!(matches!(s.begin_execute(), Err(ShellError::ExecutionPending)));

    let done = ExecutionOutcome::Success { transcript: "ok\n".into(), elapsed_seconds: 0.1, token_count: None };
    assert!(s.finish_execute(job.id, done.clone()));
    assert_eq!(s.active().unwrap().outcome, Some(done));

    // Re-executing clears the previous result straight into Pending.
    let again = s.begin_execute().unwrap();
    assert_ne!(again.id, job.id);
    assert_eq!(s.active().unwrap().outcome, Some(ExecutionOutcome::Pending));
  }

  #[test]
  fn results_from_abandoned_views_are_dropped() {
    let (_, mut s) = shell();
    s.save_credential("sk").unwrap();
    s.open_exercise(1, 1);
    let job = s.begin_execute().unwrap();

    s.navigate("/week/1");
    assert!(!s.finish_execute(job.id, ExecutionOutcome::Failure { message: "late".into() }));

    s.open_exercise(1, 1);
    let job = s.begin_execute().unwrap();
    s.reset().unwrap();
    assert!(!s.finish_execute(job.id, ExecutionOutcome::Failure { message: "late".into() }));
    assert!(s.active().unwrap().outcome.is_none());
  }

  #[test]
  fn credential_dialog_is_an_orthogonal_overlay() {
    let (mem, mut s) = shell();
    s.open_exercise(2, 1);
    s.edit("print('keep')".into()).unwrap();

    assert!(s.open_credential_dialog().dialog_open);
    assert!(matches!(s.save_credential("   "), Err(ShellError::BlankCredential)));
    assert!(s.credential_status().dialog_open);

    let st = s.save_credential("sk-new").unwrap();
    assert_eq!(st, CredentialStatus { configured: true, dialog_open: false });
    assert_eq!(mem.get(crate::credential::CREDENTIAL_KEY).as_deref(), Some("sk-new"));
    assert_eq!(s.active().unwrap().editor.text(), "print('keep')");

    s.open_credential_dialog();
    let st = s.clear_credential().unwrap();
    assert_eq!(st, CredentialStatus { configured: false, dialog_open: false });
    assert_eq!(mem.get(crate::credential::CREDENTIAL_KEY), None);
  }

  #[test]
  fn navigate_resolves_routes() {
    let (_, mut s) = shell();
    assert!(matches!(s.navigate("/week/2"), View::Browsing(Resolved::Week { week: 2 })));
    assert!(matches!(s.navigate("/week/99"), View::Browsing(Resolved::NotFound { .. })));
    assert!(matches!(s.navigate("/week/2/exercise/1"), View::ExerciseActive(v) if v.week == 2 && v.exercise == 1));
  }

  #[tokio::test]
  async fn full_round_trip_with_fake_transport() {
    let (_, mut s) = shell();
    s.save_credential("sk").unwrap();
    s.open_exercise(2, 1);
    s.edit("print(\"hello\")".into()).unwrap();

    let job = s.begin_execute().unwrap();
    let t = FakeTransport::default();
    let outcome = executor::execute(&t, &ExecutionSettings::default(), &job.source, &job.credential).await;
    assert!(s.finish_execute(job.id, outcome));

    let view = s.results().unwrap();
    assert!(view.body.contains("Week 2, Exercise 1: Zero-shot vs Few-shot"));
    assert!(view.body.contains("Output:\nhello\n"));
    assert_eq!(t.call_count(), 0);
  }
}
