//! Line-oriented pattern matching over submitted Python source.
//!
//! Nothing here evaluates code. A line is either a chat-completion call site,
//! a `print(...)` with (maybe) a string literal, or irrelevant.

use std::sync::OnceLock;

use regex::Regex;

/// Substrings identifying the two supported client call styles.
pub const CALL_SIGNATURES: [&str; 2] = ["client.chat.completions.create", "openai.ChatCompletion.create"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
  /// Contains a call signature. Checked before `print(`, comments included.
  ApiCall,
  /// Non-comment `print(` line; the first quoted literal inside the parentheses, if any.
  Print(Option<&'a str>),
  Other,
}

fn model_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"model\s*=\s*["']([^"']+)["']"#).expect("static regex"))
}

fn print_args_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"print\((.*)\)").expect("static regex"))
}

fn string_literal_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).expect("static regex"))
}

pub fn is_api_call(line: &str) -> bool {
  CALL_SIGNATURES.iter().any(|sig| line.contains(sig))
}

pub fn is_comment(line: &str) -> bool {
  line.trim_start().starts_with('#')
}

/// Quoted literal passed to `print`, e.g. `"hello"` in `print("hello")`.
/// Variables and expressions yield None.
pub fn print_literal(line: &str) -> Option<&str> {
  let args = print_args_re().captures(line)?.get(1)?.as_str();
  string_literal_re().captures(args)?.get(1).map(|m| m.as_str())
}

pub fn classify_line(line: &str) -> LineKind<'_> {
  if is_api_call(line) {
    LineKind::ApiCall
  } else if line.contains("print(") && !is_comment(line) {
    LineKind::Print(print_literal(line))
  } else {
    LineKind::Other
  }
}

/// Classify every line of `source`, in order.
pub fn scan(source: &str) -> impl Iterator<Item = LineKind<'_>> {
  source.lines().map(classify_line)
}

/// First `model = "..."` assignment anywhere in the source.
pub fn extract_model(source: &str) -> Option<&str> {
  model_re().captures(source)?.get(1).map(|m| m.as_str())
}
