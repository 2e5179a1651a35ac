//! Editor surface: the editable text of one exercise plus its immutable seed.

use serde::Serialize;

#[derive(Clone, Debug)]
pub struct EditorSurface {
  initial: String,
  text: String,
}

/// Reported after every change and on open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditorStatus {
  pub modified: bool,
  pub lines: usize,
  pub chars: usize,
}

impl EditorSurface {
  /// Start from a saved draft when there is a non-empty one, else from the seed.
  pub fn open(initial: &str, draft: Option<String>) -> Self {
    let text = draft.filter(|d| !d.is_empty()).unwrap_or_else(|| initial.to_string());
    Self { initial: initial.to_string(), text }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn initial(&self) -> &str {
    &self.initial
  }

  pub fn is_modified(&self) -> bool {
    self.text != self.initial
  }

  pub fn set_text(&mut self, text: String) -> EditorStatus {
    self.text = text;
    self.status()
  }

  pub fn reset(&mut self) -> EditorStatus {
    self.text = self.initial.clone();
    self.status()
  }

  pub fn status(&self) -> EditorStatus {
    EditorStatus {
      modified: self.is_modified(),
      lines: self.text.lines().count(),
      chars: self.text.chars().count(),
    }
  }
}
