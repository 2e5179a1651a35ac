//! SPA path parsing: `/`, `/week/{w}`, `/week/{w}/exercise/{e}`.
//!
//! Missing numbers default to 1; anything non-numeric or unknown is not found.

use serde::Serialize;

use crate::catalog::Catalog;

pub const WEEK_NOT_FOUND: &str = "The requested week does not exist.";
pub const EXERCISE_NOT_FOUND: &str = "The requested exercise does not exist.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
  Home,
  Week { week: Option<u32> },
  Exercise { week: Option<u32>, exercise: Option<usize> },
  Invalid,
}

/// A route checked against the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Resolved {
  Home,
  Week { week: u32 },
  Exercise { week: u32, exercise: usize },
  NotFound { message: String },
}

impl Route {
  pub fn parse(path: &str) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segs: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

    match segs.as_slice() {
      [] => Route::Home,
      ["week"] => Route::Week { week: None },
      ["week", w] => match w.parse() {
        Ok(w) => Route::Week { week: Some(w) },
        Err(_) => Route::Invalid,
      },
      ["week", w, "exercise"] => match w.parse() {
        Ok(w) => Route::Exercise { week: Some(w), exercise: None },
        Err(_) => Route::Invalid,
      },
      ["week", w, "exercise", e] => match (w.parse(), e.parse()) {
        (Ok(w), Ok(e)) => Route::Exercise { week: Some(w), exercise: Some(e) },
        _ => Route::Invalid,
      },
      _ => Route::Invalid,
    }
  }

  pub fn resolve(&self, catalog: &Catalog) -> Resolved {
    match *self {
      Route::Home => Resolved::Home,
      Route::Week { week } => {
        let week = week.unwrap_or(1);
        match catalog.week(week) {
          Some(_) => Resolved::Week { week },
          None => Resolved::NotFound { message: WEEK_NOT_FOUND.into() },
        }
      }
      Route::Exercise { week, exercise } => {
        let (week, exercise) = (week.unwrap_or(1), exercise.unwrap_or(1));
        match catalog.exercise(week, exercise) {
          Some(_) => Resolved::Exercise { week, exercise },
          None => Resolved::NotFound { message: EXERCISE_NOT_FOUND.into() },
        }
      }
      Route::Invalid => Resolved::NotFound { message: "Page not found.".into() },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_shapes() {
    assert_eq!(Route::parse("/"), Route::Home);
    assert_eq!(Route::parse(""), Route::Home);
    assert_eq!(Route::parse("/week/3"), Route::Week { week: Some(3) });
    assert_eq!(Route::parse("/week/3/"), Route::Week { week: Some(3) });
    assert_eq!(
      Route::parse("/week/2/exercise/1?tab=code"),
      Route::Exercise { week: Some(2), exercise: Some(1) }
    );
    assert_eq!(Route::parse("/week"), Route::Week { week: None });
    assert_eq!(Route::parse("/week/4/exercise"), Route::Exercise { week: Some(4), exercise: None });
  }

  #[test]
  fn garbage_is_invalid() {
    assert_eq!(Route::parse("/week/abc"), Route::Invalid);
    assert_eq!(Route::parse("/week/1/exercise/x"), Route::Invalid);
    assert_eq!(Route::parse("/week/-1"), Route::Invalid);
    assert_eq!(Route::parse("/settings"), Route::Invalid);
  }

  #[test]
  fn resolution_defaults_and_not_found() {
    let c = Catalog::default();
    assert_eq!(Route::parse("/week").resolve(&c), Resolved::Week { week: 1 });
    assert_eq!(Route::parse("/week/2/exercise").resolve(&c), Resolved::Exercise { week: 2, exercise: 1 });
    assert_eq!(
      Route::parse("/week/42").resolve(&c),
      Resolved::NotFound { message: WEEK_NOT_FOUND.into() }
    );
    assert_eq!(
      Route::parse("/week/1/exercise/3").resolve(&c),
      Resolved::NotFound { message: EXERCISE_NOT_FOUND.into() }
    );
    assert_eq!(
      Route::parse("/week/1/exercise/0").resolve(&c),
      Resolved::NotFound { message: EXERCISE_NOT_FOUND.into() }
    );
  }
}
