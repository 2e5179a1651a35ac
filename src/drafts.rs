//! Draft persistence: edited exercise code keyed by (week, exercise number).

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::storage::KeyValueStore;

/// Storage key of the draft for `exercise` (1-based) of `week`.
pub fn draft_key(week: u32, exercise: usize) -> String {
  format!("exercise_{week}_{exercise}")
}

#[derive(Clone)]
pub struct DraftStore {
  store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
  pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
    Self { store }
  }

  pub fn load(&self, week: u32, exercise: usize) -> Option<String> {
    self.store.get(&draft_key(week, exercise))
  }

  /// Unconditional write, used by the explicit Save action.
  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  pub fn save(&self, week: u32, exercise: usize, text: &str) -> Result<(), StoreError> {
    self.store.set(&draft_key(week, exercise), text)
  }

  #[instrument(level = "debug", skip(self))]
  pub fn clear(&self, week: u32, exercise: usize) -> Result<(), StoreError> {
    self.store.remove(&draft_key(week, exercise))
  }

  /// Edit-time save: only text that differs from the seed is written.
  /// Returns whether a write happened. Returning to the seed leaves any
  /// earlier draft in place.
  pub fn autosave(&self, week: u32, exercise: usize, text: &str, initial: &str) -> Result<bool, StoreError> {
    if text == initial {
      debug!(target: "exercise", week, exercise, "Text equals initial source; auto-save skipped");
      return Ok(false);
    }
    self.save(week, exercise, text)?;
    Ok(true)
  }
}
