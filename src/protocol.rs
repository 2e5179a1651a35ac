//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::{Exercise, Week};
use crate::editor::EditorStatus;
use crate::results::ResultsView;
use crate::route::Resolved;
use crate::shell::CredentialStatus;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  ListWeeks,
  Navigate {
    path: String,
  },
  OpenExercise {
    week: u32,
    exercise: usize,
  },
  Edit {
    code: String,
  },
  Save,
  Reset,
  Execute,
  OpenCredentialDialog,
  CloseCredentialDialog,
  SaveCredential {
    key: String,
  },
  ClearCredential,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  Weeks {
    weeks: Vec<WeekSummaryOut>,
  },
  Route {
    route: Resolved,
  },
  Week {
    week: WeekOut,
  },
  Exercise {
    exercise: ExerciseOut,
    results: ResultsView,
  },
  Editor {
    #[serde(flatten)]
    status: EditorStatus,
  },
  Saved,
  Results {
    results: ResultsView,
  },
  Credential {
    #[serde(flatten)]
    status: CredentialStatus,
  },
  Error {
    message: String,
  },
}

/// Week card for the home page.
#[derive(Debug, Serialize)]
pub struct WeekSummaryOut {
  pub number: u32,
  pub title: String,
  pub exercise_count: usize,
  /// First three exercise titles.
  pub preview: Vec<String>,
  pub more: usize,
}

#[derive(Debug, Serialize)]
pub struct WeekOut {
  pub number: u32,
  pub title: String,
  pub exercises: Vec<ExerciseSummaryOut>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseSummaryOut {
  pub number: usize,
  pub title: String,
  pub description: String,
  pub category: String,
}

/// Exercise page: content plus the editor's current text.
#[derive(Debug, Serialize)]
pub struct ExerciseOut {
  pub week: u32,
  pub week_title: String,
  pub exercise: usize,
  pub title: String,
  pub description: String,
  pub category: String,
  pub initial_code: String,
  pub code: String,
  pub modified: bool,
}

pub fn week_summaries(catalog: &Catalog) -> Vec<WeekSummaryOut> {
  catalog
    .weeks()
    .map(|(number, w)| WeekSummaryOut {
      number,
      title: w.title.clone(),
      exercise_count: w.exercises.len(),
      preview: w.exercises.iter().take(3).map(|e| e.title.clone()).collect(),
      more: w.exercises.len().saturating_sub(3),
    })
    .collect()
}

pub fn to_week_out(number: u32, w: &Week) -> WeekOut {
  WeekOut {
    number,
    title: w.title.clone(),
    exercises: w
      .exercises
      .iter()
      .enumerate()
      .map(|(i, e)| ExerciseSummaryOut {
        number: i + 1,
        title: e.title.clone(),
        description: e.description.clone(),
        category: e.category.clone(),
      })
      .collect(),
  }
}

pub fn to_exercise_out(week: u32, w: &Week, exercise: usize, e: &Exercise, code: &str) -> ExerciseOut {
  ExerciseOut {
    week,
    week_title: w.title.clone(),
    exercise,
    title: e.title.clone(),
    description: e.description.clone(),
    category: e.category.clone(),
    initial_code: e.initial_source.clone(),
    code: code.to_string(),
    modified: code != e.initial_source,
  }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
  pub path: String,
}

#[derive(Deserialize)]
pub struct CodeIn {
  pub code: String,
}

#[derive(Deserialize, Default)]
pub struct ExecuteIn {
  #[serde(default)]
  pub code: Option<String>,
}

#[derive(Serialize)]
pub struct DraftOut {
  pub code: String,
  pub modified: bool,
  pub saved: bool,
}

#[derive(Deserialize)]
pub struct CredentialIn {
  pub key: String,
}

#[derive(Serialize)]
pub struct CredentialOut {
  pub configured: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
  pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}
