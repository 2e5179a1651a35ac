//! Credential store: the single API key, mirrored between memory and storage.
//!
//! No validation of the key's shape happens here; any non-empty string counts
//! as configured. The value is never logged.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::StoreError;
use crate::storage::KeyValueStore;

pub const CREDENTIAL_KEY: &str = "openai_api_key";

pub struct CredentialStore {
  store: Arc<dyn KeyValueStore>,
  value: String,
}

impl CredentialStore {
  /// Read the persisted key (empty if unset).
  pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
    let value = store.get(CREDENTIAL_KEY).unwrap_or_default();
    Self { store, value }
  }

  /// Empty string means unset.
  pub fn get(&self) -> &str {
    &self.value
  }

  pub fn is_configured(&self) -> bool {
    !self.value.is_empty()
  }

  /// Persist first; memory is only updated when the write succeeded.
  #[instrument(level = "info", skip(self, value), fields(value_len = value.len()))]
  pub fn set(&mut self, value: &str) -> Result<(), StoreError> {
    self.store.set(CREDENTIAL_KEY, value)?;
    self.value = value.to_string();
    info!(target: "llm_course_backend", "API key stored");
    Ok(())
  }

  #[instrument(level = "info", skip(self))]
  pub fn clear(&mut self) -> Result<(), StoreError> {
    self.store.remove(CREDENTIAL_KEY)?;
    self.value.clear();
    info!(target: "llm_course_backend", "API key cleared");
    Ok(())
  }
}
