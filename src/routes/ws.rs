//! WebSocket upgrade + message loop. Each connection drives one Page Shell.
//!
//! Client messages are parsed as JSON and applied to the shell; every request gets
//! one JSON reply. Executions run on a spawned task and report back through a
//! channel, so an Execute is answered with the Pending panel first and the final
//! panel follows when the job finishes (if the view still wants it).

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, instrument, Instrument};
use uuid::Uuid;

use crate::domain::ExecutionOutcome;
use crate::executor;
use crate::protocol::{to_exercise_out, to_week_out, week_summaries, ClientWsMessage, ServerWsMessage};
use crate::route::Resolved;
use crate::shell::{ExecutionJob, PageShell, View};
use crate::state::AppState;

type JobResult = (u64, ExecutionOutcome);

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session = Uuid::new_v4();
  info!(target: "llm_course_backend", %session, "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, session))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, session: Uuid) {
  info!(target: "llm_course_backend", "WebSocket connected");
  let mut shell = PageShell::new(state.catalog.clone(), state.store.clone());
  let (tx, mut rx) = mpsc::unbounded_channel::<JobResult>();

  loop {
    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            debug!(target: "llm_course_backend", len = txt.len(), "WS received");
            let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(incoming) => handle_client_ws(incoming, &mut shell, &state, &tx, session),
              Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
            };
            if send(&mut socket, &reply).await.is_err() {
              break;
            }
          }
          Message::Ping(payload) => {
            let _ = socket.send(Message::Pong(payload)).await;
          }
          Message::Close(_) => break,
          _ => {}
        }
      }
      Some((job_id, outcome)) = rx.recv() => {
        if !shell.finish_execute(job_id, outcome) {
          continue;
        }
        if let Some(results) = shell.results() {
          if send(&mut socket, &ServerWsMessage::Results { results }).await.is_err() {
            break;
          }
        }
      }
    }
  }
  info!(target: "llm_course_backend", "WebSocket disconnected");
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "llm_course_backend", error = %e, "WS send error");
    e
  })
}

fn handle_client_ws(
  msg: ClientWsMessage,
  shell: &mut PageShell,
  state: &Arc<AppState>,
  tx: &mpsc::UnboundedSender<JobResult>,
  session: Uuid,
) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListWeeks => ServerWsMessage::Weeks { weeks: week_summaries(&state.catalog) },

    ClientWsMessage::Navigate { path } => {
      shell.navigate(&path);
      navigation_message(shell, state)
    }

    ClientWsMessage::OpenExercise { week, exercise } => {
      if shell.open_exercise(week, exercise).is_some() {
        exercise_message(shell, state)
      } else {
        error_message(crate::route::EXERCISE_NOT_FOUND)
      }
    }

    ClientWsMessage::Edit { code } => match shell.edit(code) {
      Ok(status) => ServerWsMessage::Editor { status },
      Err(e) => error_message(e),
    },

    ClientWsMessage::Save => match shell.save() {
      Ok(()) => ServerWsMessage::Saved,
      Err(e) => error_message(e),
    },

    ClientWsMessage::Reset => match shell.reset() {
      Ok(_) => exercise_message(shell, state),
      Err(e) => error_message(e),
    },

    ClientWsMessage::Execute => match shell.begin_execute() {
      Ok(job) => {
        spawn_execution(job, state.clone(), tx.clone(), session);
        match shell.results() {
          Some(results) => ServerWsMessage::Results { results },
          None => error_message("no exercise is open"),
        }
      }
      Err(e) => error_message(e),
    },

    ClientWsMessage::OpenCredentialDialog => ServerWsMessage::Credential { status: shell.open_credential_dialog() },

    ClientWsMessage::CloseCredentialDialog => ServerWsMessage::Credential { status: shell.close_credential_dialog() },

    ClientWsMessage::SaveCredential { key } => match shell.save_credential(&key) {
      Ok(status) => {
        info!(target: "llm_course_backend", "WS credential saved");
        ServerWsMessage::Credential { status }
      }
      Err(e) => error_message(e),
    },

    ClientWsMessage::ClearCredential => match shell.clear_credential() {
      Ok(status) => ServerWsMessage::Credential { status },
      Err(e) => error_message(e),
    },
  }
}

/// Reply to a navigation: the exercise view, a week listing, or the resolved route.
fn navigation_message(shell: &PageShell, state: &AppState) -> ServerWsMessage {
  match shell.view() {
    View::ExerciseActive(_) => exercise_message(shell, state),
    View::Browsing(Resolved::Week { week }) => match state.catalog.week(*week) {
      Some(w) => ServerWsMessage::Week { week: to_week_out(*week, w) },
      None => error_message(crate::route::WEEK_NOT_FOUND),
    },
    View::Browsing(route) => ServerWsMessage::Route { route: route.clone() },
  }
}

fn error_message(e: impl ToString) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

/// Exercise content, editor text and results panel of the active view.
fn exercise_message(shell: &PageShell, state: &AppState) -> ServerWsMessage {
  let (Some(view), Some(results)) = (shell.active(), shell.results()) else {
    return error_message("no exercise is open");
  };
  let Some(week) = state.catalog.week(view.week) else {
    return error_message(crate::route::WEEK_NOT_FOUND);
  };
  let Some(ex) = week.exercise(view.exercise) else {
    return error_message(crate::route::EXERCISE_NOT_FOUND);
  };
  ServerWsMessage::Exercise {
    exercise: to_exercise_out(view.week, week, view.exercise, ex, view.editor.text()),
    results,
  }
}

fn spawn_execution(job: ExecutionJob, state: Arc<AppState>, tx: mpsc::UnboundedSender<JobResult>, session: Uuid) {
  let span = info_span!("ws_execution", %session, job = job.id, week = job.week, exercise = job.exercise);
  tokio::spawn(
    async move {
      let outcome = executor::execute(&state.openai, &state.settings, &job.source, &job.credential).await;
      info!(target: "exercise", success = matches!(outcome, ExecutionOutcome::Success { .. }), "WS execution finished");
      // The connection may be gone; the result is simply dropped then.
      let _ = tx.send((job.id, outcome));
    }
    .instrument(span),
  );
}
