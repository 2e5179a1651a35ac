//! Error types shared across the backend.
//!
//! `ExecError` doubles as the user-visible message: its `Display` text is what
//! the Results Panel shows, verbatim.

use std::path::PathBuf;

use thiserror::Error;

/// Why an execution request failed. All variants are terminal for that request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
  #[error("credential required")]
  MissingCredential,

  #[error("OpenAI API call failed: OpenAI API error: {status}{}", detail_suffix(.detail))]
  HttpError { status: u16, detail: Option<String> },

  #[error("OpenAI API call failed: {0}")]
  NetworkError(String),

  #[error("OpenAI API call failed: malformed response: {0}")]
  MalformedResponse(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
  detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

/// Failures of the persistent key/value store.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("storage I/O error at {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("storage file {} is not a JSON object of strings: {source}", .path.display())]
  Corrupt {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Rejected Page Shell transitions.
#[derive(Debug, Error)]
pub enum ShellError {
  #[error("no exercise is open")]
  NoActiveExercise,

  #[error("an execution is already pending for this exercise")]
  ExecutionPending,

  #[error("set your OpenAI API key to execute code")]
  MissingCredential,

  #[error("the API key must not be blank")]
  BlankCredential,

  #[error(transparent)]
  Store(#[from] StoreError),
}
