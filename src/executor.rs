//! The execution heuristic: a best-effort emulation of running submitted code.
//!
//! Lines are scanned in order. `print("literal")` lines append the literal, and
//! each chat-completion call site issues one real request with a fixed greeting
//! and appends the model's reply. Nothing is evaluated.
//!
//! Any failed request fails the whole run: output gathered from earlier lines
//! is dropped, and later lines are not processed.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::config::ExecutionSettings;
use crate::domain::{ExecutionOutcome, ExecutionReport};
use crate::error::ExecError;
use crate::openai::{ChatCompletionRequest, ChatTransport};
use crate::scan::{self, LineKind};

pub const NO_OUTPUT_PLACEHOLDER: &str = "Code executed successfully. No output generated.";

/// Run `source` and fold the result into an outcome for the Results Panel.
pub async fn execute<T: ChatTransport>(
  transport: &T,
  settings: &ExecutionSettings,
  source: &str,
  credential: &str,
) -> ExecutionOutcome {
  run(transport, settings, source, credential).await.into()
}

#[instrument(level = "info", skip_all, fields(source_len = source.len(), lines = source.lines().count()))]
pub async fn run<T: ChatTransport>(
  transport: &T,
  settings: &ExecutionSettings,
  source: &str,
  credential: &str,
) -> Result<ExecutionReport, ExecError> {
  if credential.is_empty() {
    warn!(target: "exercise", "Execution refused: no API key");
    return Err(ExecError::MissingCredential);
  }

  let started = Instant::now();
  let model = scan::extract_model(source).unwrap_or(settings.default_model.as_str());
  let mut transcript = String::new();
  let mut api_calls = 0usize;
  let mut token_count: Option<u32> = None;

  for (line_no, kind) in scan::scan(source).enumerate() {
    match kind {
      LineKind::ApiCall => {
        api_calls += 1;
        debug!(target: "exercise", line = line_no + 1, %model, "Call site detected");
        let req = ChatCompletionRequest::greeting(model, settings);
        let res = transport.chat_completion(credential, &req).await?;
        let reply = res.first_reply()?;

        transcript.push_str(&format!("OpenAI Response: {}\n", reply));
        match res.total_tokens() {
          Some(n) => {
            token_count = Some(token_count.unwrap_or(0).saturating_add(n));
            transcript.push_str(&format!("Tokens used: {}\n", n));
          }
          None => transcript.push_str("Tokens used: N/A\n"),
        }
      }
      LineKind::Print(Some(literal)) => {
        transcript.push_str(literal);
        transcript.push('\n');
      }
      LineKind::Print(None) | LineKind::Other => {}
    }
  }

  if api_calls == 0 && transcript.is_empty() {
    transcript = NO_OUTPUT_PLACEHOLDER.to_string();
  }

  let elapsed_seconds = started.elapsed().as_secs_f64();
  info!(target: "exercise", api_calls, transcript_len = transcript.len(), ?token_count, elapsed_seconds, "Execution finished");
  Ok(ExecutionReport { transcript, elapsed_seconds, token_count })
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::collections::VecDeque;
  use std::future::Future;
  use std::sync::Mutex;

  use crate::openai::{ChatChoice, ChatCompletionResponse, ChatMessageResp, Usage};

  /// Scripted transport: pops one reply per call and records every request.
  #[derive(Default)]
  pub struct FakeTransport {
    replies: Mutex<VecDeque<Result<ChatCompletionResponse, ExecError>>>,
    pub calls: Mutex<Vec<(String, ChatCompletionRequest)>>,
  }

  impl FakeTransport {
    pub fn replying(replies: Vec<Result<ChatCompletionResponse, ExecError>>) -> Self {
      Self { replies: Mutex::new(replies.into()), calls: Mutex::default() }
    }

    pub fn call_count(&self) -> usize {
      self.calls.lock().unwrap().len()
    }
  }

  pub fn reply(content: &str, total_tokens: Option<u32>) -> ChatCompletionResponse {
    ChatCompletionResponse {
      choices: vec![ChatChoice { message: ChatMessageResp { content: Some(content.to_string()) } }],
      usage: total_tokens.map(|t| Usage { prompt_tokens: None, completion_tokens: None, total_tokens: Some(t) }),
    }
  }

  impl ChatTransport for FakeTransport {
    fn chat_completion(
      &self,
      credential: &str,
      req: &ChatCompletionRequest,
    ) -> impl Future<Output = Result<ChatCompletionResponse, ExecError>> + Send {
      self.calls.lock().unwrap().push((credential.to_string(), req.clone()));
      let next = self
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ExecError::NetworkError("no scripted reply".into())));
      async move { next }
    }
  }

  fn settings() -> ExecutionSettings {
    ExecutionSettings::default()
  }

  const CALL_LINE: &str = "response = client.chat.completions.create(";

  #[tokio::test]
  async fn empty_credential_fails_before_any_call() {
    let t = FakeTransport::replying(vec![Ok(reply("unused", None))]);
    for src in ["", "print('hi')", CALL_LINE] {
      let out = execute(&t, &settings(), src, "").await;
      assert_eq!(out, ExecutionOutcome::Failure { message: "credential required".into() });
    }
    assert_eq!(t.call_count(), 0);
  }

  #[tokio::test]
  async fn silent_code_yields_placeholder_without_network() {
    let t = FakeTransport::default();
    let r = run(&t, &settings(), "import os\nx = 1 + 2\nprint(x)", "sk").await.unwrap();
    assert_eq!(r.transcript, NO_OUTPUT_PLACEHOLDER);
    assert_eq!(r.token_count, None);
    assert_eq!(t.call_count(), 0);
  }

  #[tokio::test]
  async fn print_literal_becomes_transcript_line() {
    let t = FakeTransport::default();
    let r = run(&t, &settings(), r#"print("hello")"#, "sk").await.unwrap();
    assert_eq!(r.transcript, "hello\n");
  }

  #[tokio::test]
  async fn commented_print_is_skipped() {
    let t = FakeTransport::default();
    let r = run(&t, &settings(), "# print(\"hello\")\nprint('bye')", "sk").await.unwrap();
    assert!(!r.transcript.contains("hello"));
    assert_eq!(r.transcript, "bye\n");
  }

  #[tokio::test]
  async fn call_site_appends_reply_and_tokens() {
    let t = FakeTransport::replying(vec![Ok(reply("I am an assistant.", Some(27)))]);
    let src = format!("print('start')\n{CALL_LINE}\n    model=\"gpt-4o-mini\",\n)\nprint(result)");
    let r = run(&t, &settings(), &src, "sk-live").await.unwrap();

    assert_eq!(r.transcript, "start\nOpenAI Response: I am an assistant.\nTokens used: 27\n");
    assert_eq!(r.token_count, Some(27));

    let calls = t.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (cred, req) = &calls[0];
    assert_eq!(cred, "sk-live");
    assert_eq!(req.model, "gpt-4o-mini");
    assert_eq!(req.max_tokens, 100);
    assert_eq!(req.messages.len(), 1);
    assert_eq!(req.messages[0].role, "user");
    assert_eq!(req.messages[0].content, "Hello! Can you introduce yourself?");
  }

  #[tokio::test]
  async fn zero_reported_tokens_are_printed_as_zero() {
    let t = FakeTransport::replying(vec![Ok(reply("ok", Some(0)))]);
    let r = run(&t, &settings(), CALL_LINE, "sk").await.unwrap();
    assert_eq!(r.transcript, "OpenAI Response: ok\nTokens used: 0\n");
    assert_eq!(r.token_count, Some(0));
  }

  #[tokio::test]
  async fn default_model_when_source_names_none() {
    let t = FakeTransport::replying(vec![Ok(reply("ok", None))]);
    let r = run(&t, &settings(), CALL_LINE, "sk").await.unwrap();
    assert_eq!(r.transcript, "OpenAI Response: ok\nTokens used: N/A\n");
    assert_eq!(r.token_count, None);
    assert_eq!(t.calls.lock().unwrap()[0].1.model, "gpt-3.5-turbo");
  }

  #[tokio::test]
  async fn http_error_discards_partial_transcript() {
    let t = FakeTransport::replying(vec![Err(ExecError::HttpError { status: 401, detail: None })]);
    let src = format!("print('before')\n{CALL_LINE}\nprint('after')");
    let out = execute(&t, &settings(), &src, "sk").await;

    match out {
      ExecutionOutcome::Failure { message } => {
        assert!(message.contains("401"), "{message}");
        assert!(!message.contains("before"));
      }
      other => panic!("expected failure, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn every_call_site_is_processed_until_one_fails() {
    let t = FakeTransport::replying(vec![
      Ok(reply("first", Some(10))),
      Ok(reply("second", Some(5))),
      Err(ExecError::NetworkError("connection reset".into())),
      Ok(reply("never", None)),
    ]);
    let ok_src = format!("{CALL_LINE}\n{CALL_LINE}");
    let r = run(&t, &settings(), &ok_src, "sk").await.unwrap();
    assert_eq!(
      r.transcript,
      "OpenAI Response: first\nTokens used: 10\nOpenAI Response: second\nTokens used: 5\n"
    );
    assert_eq!(r.token_count, Some(15));

    let failing = format!("{CALL_LINE}\n{CALL_LINE}\nprint('tail')");
    let err = run(&t, &settings(), &failing, "sk").await.unwrap_err();
    assert_eq!(err, ExecError::NetworkError("connection reset".into()));
    // The failing call aborted the run: the fourth scripted reply was never requested.
    assert_eq!(t.call_count(), 3);
  }

  #[tokio::test]
  async fn reply_without_content_is_malformed() {
    let bad = ChatCompletionResponse { choices: vec![], usage: None };
    let t = FakeTransport::replying(vec![Ok(bad)]);
    let err = run(&t, &settings(), CALL_LINE, "sk").await.unwrap_err();
    assert!(matches!(err, ExecError::MalformedResponse(_)));
  }

  #[tokio::test]
  async fn api_call_with_no_prints_still_skips_placeholder() {
    let t = FakeTransport::replying(vec![Ok(reply("", None))]);
    let r = run(&t, &settings(), CALL_LINE, "sk").await.unwrap();
    assert!(!r.transcript.contains(NO_OUTPUT_PLACEHOLDER));
  }
}
