//! Loading course configuration (execution constants + optional extra weeks) from TOML.
//!
//! See `CourseConfig` and `ExecutionSettings` for expected schema.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Exercise;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GREETING: &str = "Hello! Can you introduce yourself?";
pub const DEFAULT_MAX_TOKENS: u32 = 100;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CourseConfig {
  #[serde(default)]
  pub execution: ExecutionSettings,
  #[serde(default)]
  pub weeks: Vec<WeekCfg>,
}

/// Week entry accepted in TOML configuration. Replaces a built-in week with the same number.
#[derive(Clone, Debug, Deserialize)]
pub struct WeekCfg {
  pub number: u32,
  pub title: String,
  #[serde(default)]
  pub exercises: Vec<Exercise>,
}

/// Constants of the simulated execution: where the single greeting request goes and how it looks.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionSettings {
  pub endpoint: String,
  /// Used when the submitted code has no `model = "..."` assignment.
  pub default_model: String,
  pub greeting: String,
  pub max_tokens: u32,
  /// None keeps the transport default (no timeout).
  pub timeout_secs: Option<u64>,
}

impl Default for ExecutionSettings {
  fn default() -> Self {
    Self {
      endpoint: DEFAULT_ENDPOINT.into(),
      default_model: DEFAULT_MODEL.into(),
      greeting: DEFAULT_GREETING.into(),
      max_tokens: DEFAULT_MAX_TOKENS,
      timeout_secs: None,
    }
  }
}

impl ExecutionSettings {
  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }

  /// Apply `OPENAI_BASE_URL` (e.g. a proxy) on top of whatever the file said.
  pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
    if let Some(base) = base_url.map(str::trim).filter(|b| !b.is_empty()) {
      self.endpoint = format!("{}/chat/completions", base.trim_end_matches('/'));
    }
    self
  }
}

/// Parse a TOML document into `CourseConfig`.
pub fn parse_course_config(s: &str) -> Result<CourseConfig, toml::de::Error> {
  toml::from_str::<CourseConfig>(s)
}

/// Attempt to load `CourseConfig` from COURSE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_course_config_from_env() -> Option<CourseConfig> {
  let path = std::env::var("COURSE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_course_config(&s) {
      Ok(cfg) => {
        info!(target: "llm_course_backend", %path, weeks = cfg.weeks.len(), "Loaded course config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "llm_course_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "llm_course_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let cfg = parse_course_config("").unwrap();
    assert_eq!(cfg.execution, ExecutionSettings::default());
    assert!(cfg.weeks.is_empty());
    assert_eq!(cfg.execution.timeout(), None);
  }

  #[test]
  fn partial_execution_table_keeps_other_defaults() {
    let cfg = parse_course_config(
      r#"
      [execution]
      default_model = "gpt-4o-mini"
      timeout_secs = 30

      [[weeks]]
      number = 9
      title = "Extras"

      [[weeks.exercises]]
      title = "Echo"
      description = "Print something"
      category = "basics"
      initial_source = "print('hi')"
      "#,
    )
    .unwrap();

    assert_eq!(cfg.execution.default_model, "gpt-4o-mini");
    assert_eq!(cfg.execution.max_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(cfg.execution.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(cfg.execution.timeout(), Some(Duration::from_secs(30)));
    assert_eq!(cfg.weeks.len(), 1);
    assert_eq!(cfg.weeks[0].exercises[0].initial_source, "print('hi')");
  }

  #[test]
  fn base_url_override_targets_chat_completions() {
    let s = ExecutionSettings::default().with_base_url(Some("http://127.0.0.1:9999/v1/"));
    assert_eq!(s.endpoint, "http://127.0.0.1:9999/v1/chat/completions");

    let untouched = ExecutionSettings::default().with_base_url(Some("  "));
    assert_eq!(untouched.endpoint, DEFAULT_ENDPOINT);
  }
}
