//! Domain models used by the backend: course content and execution outcomes.

use serde::{Deserialize, Serialize};

use crate::error::ExecError;

/// One exercise of a week. Immutable once the catalog is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub title: String,
  pub description: String,
  /// Free-form tag (e.g., "basic-api", "rag").
  pub category: String,
  /// Seed code shown in the editor before any draft exists.
  pub initial_source: String,
}

/// A week of the course: a title plus its exercises in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Week {
  pub title: String,
  pub exercises: Vec<Exercise>,
}

impl Week {
  /// Exercises are addressed 1-based, like the URLs that point at them.
  pub fn exercise(&self, number: usize) -> Option<&Exercise> {
    number.checked_sub(1).and_then(|idx| self.exercises.get(idx))
  }
}

/// Successful run of the execution heuristic.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionReport {
  pub transcript: String,
  pub elapsed_seconds: f64,
  /// Sum of `total_tokens` reported by the API calls, if any reported usage.
  pub token_count: Option<u32>,
}

/// Live result of an execution request inside one exercise view.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
  Pending,
  Success {
    transcript: String,
    elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_count: Option<u32>,
  },
  Failure {
    message: String,
  },
}

impl ExecutionOutcome {
  pub fn is_pending(&self) -> bool {
    matches!(self, ExecutionOutcome::Pending)
  }
}

impl From<Result<ExecutionReport, ExecError>> for ExecutionOutcome {
  fn from(result: Result<ExecutionReport, ExecError>) -> Self {
    match result {
      Ok(r) => ExecutionOutcome::Success {
        transcript: r.transcript,
        elapsed_seconds: r.elapsed_seconds,
        token_count: r.token_count,
      },
      Err(e) => ExecutionOutcome::Failure { message: e.to_string() },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn week() -> Week {
    Week {
      title: "W".into(),
      exercises: vec![Exercise {
        title: "only".into(),
        description: String::new(),
        category: "basic-api".into(),
        initial_source: "print(\"x\")".into(),
      }],
    }
  }

  #[test]
  fn exercise_numbers_are_one_based() {
    let w = week();
    assert!(w.exercise(0).is_none());
    assert_eq!(w.exercise(1).map(|e| e.title.as_str()), Some("only"));
    assert!(w.exercise(2).is_none());
  }

  #[test]
  fn failure_carries_error_text() {
    let out: ExecutionOutcome = Err(ExecError::MissingCredential).into();
    assert_eq!(out, ExecutionOutcome::Failure { message: "credential required".into() });
  }

  #[test]
  fn outcome_serializes_with_status_tag() {
    let out = ExecutionOutcome::Success { transcript: "hi\n".into(), elapsed_seconds: 0.5, token_count: None };
    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["status"], "success");
    assert_eq!(v["transcript"], "hi\n");
    assert!(v.get("token_count").is_none());
  }
}
