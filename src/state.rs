//! Application state: catalog, persistent store, OpenAI client, and the in-flight execution set.
//!
//! This module owns:
//!   - the frozen content catalog (built-in weeks + TOML overrides)
//!   - the key/value store (memory, or a JSON file when COURSE_STORE_PATH is set)
//!   - execution settings and the OpenAI client built from them
//!   - which (week, exercise) pairs currently have an HTTP execution running

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{info, instrument};

use crate::catalog::Catalog;
use crate::config::{load_course_config_from_env, ExecutionSettings};
use crate::credential::CredentialStore;
use crate::drafts::DraftStore;
use crate::openai::OpenAI;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

type InFlightSet = Arc<Mutex<HashSet<(u32, usize)>>>;

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<Catalog>,
  pub store: Arc<dyn KeyValueStore>,
  pub settings: ExecutionSettings,
  pub openai: OpenAI,
  in_flight: InFlightSet,
}

/// Marks one exercise as executing; released on drop.
pub struct InFlightGuard {
  set: InFlightSet,
  key: (u32, usize),
}

impl Drop for InFlightGuard {
  fn drop(&mut self) {
    self.set.lock().unwrap_or_else(|p| p.into_inner()).remove(&self.key);
  }
}

impl AppState {
  /// Build state from env: load config, open the store, build the catalog and client.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
    let cfg = load_course_config_from_env().unwrap_or_default();
    let base_url = std::env::var("OPENAI_BASE_URL").ok();
    let settings = cfg.execution.clone().with_base_url(base_url.as_deref());

    let store: Arc<dyn KeyValueStore> = match std::env::var("COURSE_STORE_PATH") {
      Ok(path) if !path.trim().is_empty() => Arc::new(FileStore::open(path.trim())?),
      _ => {
        info!(target: "llm_course_backend", "COURSE_STORE_PATH not set; drafts and key live in memory only.");
        Arc::new(MemoryStore::new())
      }
    };

    let catalog = Catalog::with_overrides(&cfg.weeks);
    info!(target: "exercise", weeks = catalog.len(), "Catalog ready");
    for (number, week) in catalog.weeks() {
      info!(target: "exercise", week = number, title = %week.title, exercises = week.exercises.len(), "Catalog week");
    }

    let state = Self::new(catalog, store, settings)?;
    info!(target: "llm_course_backend", endpoint = %state.settings.endpoint, default_model = %state.settings.default_model, max_tokens = state.settings.max_tokens, "Execution settings");
    Ok(state)
  }

  pub fn new(catalog: Catalog, store: Arc<dyn KeyValueStore>, settings: ExecutionSettings) -> Result<Self, reqwest::Error> {
    let openai = OpenAI::new(&settings)?;
    Ok(Self {
      catalog: Arc::new(catalog),
      store,
      settings,
      openai,
      in_flight: Arc::default(),
    })
  }

  pub fn drafts(&self) -> DraftStore {
    DraftStore::new(self.store.clone())
  }

  /// Fresh view of the persisted key.
  pub fn credential(&self) -> CredentialStore {
    CredentialStore::load(self.store.clone())
  }

  /// None while another execution of the same exercise is running.
  pub fn try_begin_execution(&self, week: u32, exercise: usize) -> Option<InFlightGuard> {
    let inserted = self.in_flight.lock().unwrap_or_else(|p| p.into_inner()).insert((week, exercise));
    inserted.then(|| InFlightGuard { set: self.in_flight.clone(), key: (week, exercise) })
  }
}
