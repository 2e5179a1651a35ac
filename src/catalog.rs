//! Read-only content catalog: week number -> week, built once at startup.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::config::WeekCfg;
use crate::domain::{Exercise, Week};
use crate::seeds::seed_weeks;

#[derive(Clone, Debug)]
pub struct Catalog {
  weeks: BTreeMap<u32, Week>,
}

impl Catalog {
  pub fn new(weeks: BTreeMap<u32, Week>) -> Self {
    Self { weeks }
  }

  /// Built-in weeks, with configured weeks replacing or extending them by number.
  pub fn with_overrides(overrides: &[WeekCfg]) -> Self {
    let mut weeks = seed_weeks();
    for w in overrides {
      if w.number == 0 {
        warn!(target: "exercise", title = %w.title, "Skipping configured week 0; weeks start at 1.");
        continue;
      }
      let replaced = weeks
        .insert(w.number, Week { title: w.title.clone(), exercises: w.exercises.clone() })
        .is_some();
      info!(target: "exercise", week = w.number, exercises = w.exercises.len(), replaced, "Configured week loaded");
    }
    Self { weeks }
  }

  pub fn week(&self, number: u32) -> Option<&Week> {
    self.weeks.get(&number)
  }

  /// `exercise` is 1-based.
  pub fn exercise(&self, week: u32, exercise: usize) -> Option<&Exercise> {
    self.week(week).and_then(|w| w.exercise(exercise))
  }

  /// Weeks in ascending number order.
  pub fn weeks(&self) -> impl Iterator<Item = (u32, &Week)> {
    self.weeks.iter().map(|(n, w)| (*n, w))
  }

  pub fn len(&self) -> usize {
    self.weeks.len()
  }
}

impl Default for Catalog {
  fn default() -> Self {
    Self::new(seed_weeks())
  }
}
