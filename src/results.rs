//! Results Panel rendering: idle, pending, error and success states.

use serde::Serialize;

use crate::domain::ExecutionOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
  Idle,
  Pending,
  Error,
  Success,
}

/// What the panel shows. `body` is preformatted text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultsView {
  pub state: PanelState,
  pub heading: String,
  pub body: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub elapsed_seconds: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token_count: Option<u32>,
}

/// Which exercise the outcome belongs to; printed in the success report.
#[derive(Clone, Copy, Debug)]
pub struct ReportContext<'a> {
  pub week: u32,
  pub exercise: usize,
  pub title: &'a str,
}

pub fn render(outcome: Option<&ExecutionOutcome>, ctx: ReportContext<'_>) -> ResultsView {
  match outcome {
    None => ResultsView {
      state: PanelState::Idle,
      heading: "Click \"Execute\" to run your code".into(),
      body: "Results will appear here".into(),
      elapsed_seconds: None,
      token_count: None,
    },
    Some(ExecutionOutcome::Pending) => ResultsView {
      state: PanelState::Pending,
      heading: "Executing code...".into(),
      body: String::new(),
      elapsed_seconds: None,
      token_count: None,
    },
    Some(ExecutionOutcome::Failure { message }) => ResultsView {
      state: PanelState::Error,
      heading: "Execution Error".into(),
      body: message.clone(),
      elapsed_seconds: None,
      token_count: None,
    },
    Some(ExecutionOutcome::Success { transcript, elapsed_seconds, token_count }) => ResultsView {
      state: PanelState::Success,
      heading: "Execution Complete".into(),
      body: success_report(ctx, transcript, *elapsed_seconds, *token_count),
      elapsed_seconds: Some(*elapsed_seconds),
      token_count: *token_count,
    },
  }
}

fn success_report(ctx: ReportContext<'_>, transcript: &str, elapsed_seconds: f64, token_count: Option<u32>) -> String {
  let output = if transcript.is_empty() { "No output generated" } else { transcript };
  let mut report = format!(
    "Execution completed successfully!\n\nWeek {}, Exercise {}: {}\n\nOutput:\n{}\n\nExecution time: {:.2}s",
    ctx.week, ctx.exercise, ctx.title, output, elapsed_seconds
  );
  if let Some(tokens) = token_count {
    report.push_str(&format!("\nTokens: {tokens}"));
  }
  report.trim().to_string()
}
