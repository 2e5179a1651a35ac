//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
  }

  #[test]
  fn cuts_on_char_boundary() {
    // 'é' is two bytes; cutting at 2 would split it.
    let s = "aébc";
    assert_eq!(trunc_for_log(s, 2), "a… (5 bytes total)");
  }
}
