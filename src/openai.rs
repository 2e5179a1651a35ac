//! Minimal OpenAI chat.completions client for the simulated execution.
//!
//! The credential travels per call (it belongs to the viewer, not to the server).
//! Calls are instrumented and log model names, latencies, and status codes (not contents).
//!
//! NOTE: We never log the API key.

use std::future::Future;
use std::time::Instant;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, Instrument};

use crate::config::ExecutionSettings;
use crate::error::ExecError;
use crate::util::trunc_for_log;

/// Seam between the execution heuristic and the network.
pub trait ChatTransport: Send + Sync {
  fn chat_completion(
    &self,
    credential: &str,
    req: &ChatCompletionRequest,
  ) -> impl Future<Output = Result<ChatCompletionResponse, ExecError>> + Send;
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub endpoint: String,
}

impl OpenAI {
  pub fn new(settings: &ExecutionSettings) -> Result<Self, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.timeout() {
      builder = builder.timeout(timeout);
    }
    Ok(Self { client: builder.build()?, endpoint: settings.endpoint.clone() })
  }
}

impl ChatTransport for OpenAI {
  fn chat_completion(
    &self,
    credential: &str,
    req: &ChatCompletionRequest,
  ) -> impl Future<Output = Result<ChatCompletionResponse, ExecError>> + Send {
    let call = self
      .client
      .post(&self.endpoint)
      .header(USER_AGENT, "llm-course-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", credential))
      .json(req);
    let span = info_span!("chat_completion", model = %req.model, endpoint = %self.endpoint);

    async move {
      let start = Instant::now();
      let res = call.send().await.map_err(|e| {
        error!(elapsed = ?start.elapsed(), error = %e, "OpenAI request failed to send");
        ExecError::NetworkError(e.to_string())
      })?;

      let status = res.status();
      if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        error!(elapsed = ?start.elapsed(), status = status.as_u16(), body = %trunc_for_log(&body, 300), "OpenAI returned an error status");
        return Err(ExecError::HttpError { status: status.as_u16(), detail: extract_openai_error(&body) });
      }

      let body: ChatCompletionResponse =
        res.json().await.map_err(|e| ExecError::MalformedResponse(e.to_string()))?;
      if let Some(usage) = &body.usage {
        info!(elapsed = ?start.elapsed(), prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
      } else {
        info!(elapsed = ?start.elapsed(), "OpenAI response without usage");
      }
      Ok(body)
    }
    .instrument(span)
  }
}

// --- Chat DTOs ---

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
  pub model: String,
  pub messages: Vec<ChatMessageReq>,
  pub max_tokens: u32,
}

impl ChatCompletionRequest {
  /// The fixed single-message payload sent for every detected call site.
  pub fn greeting(model: &str, settings: &ExecutionSettings) -> Self {
    Self {
      model: model.to_string(),
      messages: vec![ChatMessageReq { role: "user".into(), content: settings.greeting.clone() }],
      max_tokens: settings.max_tokens,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessageReq {
  pub role: String,
  pub content: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatCompletionResponse {
  #[serde(default)]
  pub choices: Vec<ChatChoice>,
  #[serde(default)]
  pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
  /// Text of the first choice.
  pub fn first_reply(&self) -> Result<&str, ExecError> {
    let choice = self
      .choices
      .first()
      .ok_or_else(|| ExecError::MalformedResponse("response has no choices".into()))?;
    choice
      .message
      .content
      .as_deref()
      .ok_or_else(|| ExecError::MalformedResponse("first choice has no message content".into()))
  }

  pub fn total_tokens(&self) -> Option<u32> {
    self.usage.as_ref().and_then(|u| u.total_tokens)
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatChoice {
  pub message: ChatMessageResp,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatMessageResp {
  pub content: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Usage {
  #[serde(default)]
  pub prompt_tokens: Option<u32>,
  #[serde(default)]
  pub completion_tokens: Option<u32>,
  #[serde(default)]
  pub total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
  use serde_json::{json, Value};

  #[derive(Clone, Default)]
  struct Seen {
    auth: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
  }

  async fn mock_ok(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    seen.auth.lock().unwrap().push(auth);
    seen.bodies.lock().unwrap().push(body);
    Json(json!({
      "choices": [{ "message": { "role": "assistant", "content": "Hi, I am a model." } }],
      "usage": { "prompt_tokens": 12, "completion_tokens": 30, "total_tokens": 42 }
    }))
  }

  async fn mock_unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": { "message": "Incorrect API key provided" } })))
  }

  async fn mock_garbage() -> &'static str {
    "not json"
  }

  async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1/chat/completions")
  }

  fn client_for(endpoint: String) -> OpenAI {
    let settings = ExecutionSettings { endpoint, ..ExecutionSettings::default() };
    OpenAI::new(&settings).unwrap()
  }

  #[tokio::test]
  async fn sends_bearer_credential_and_greeting_payload() {
    let seen = Seen::default();
    let endpoint = serve(Router::new().route("/v1/chat/completions", post(mock_ok)).with_state(seen.clone())).await;
    let oa = client_for(endpoint);

    let req = ChatCompletionRequest::greeting("gpt-4", &ExecutionSettings::default());
    let res = oa.chat_completion("sk-abc", &req).await.unwrap();

    assert_eq!(res.first_reply().unwrap(), "Hi, I am a model.");
    assert_eq!(res.total_tokens(), Some(42));
    assert_eq!(seen.auth.lock().unwrap().as_slice(), ["Bearer sk-abc"]);
    let body = seen.bodies.lock().unwrap()[0].clone();
    assert_eq!(
      body,
      json!({
        "model": "gpt-4",
        "messages": [{ "role": "user", "content": "Hello! Can you introduce yourself?" }],
        "max_tokens": 100
      })
    );
  }

  #[tokio::test]
  async fn error_status_maps_to_http_error_with_detail() {
    let endpoint = serve(Router::new().route("/v1/chat/completions", post(mock_unauthorized))).await;
    let oa = client_for(endpoint);
    let req = ChatCompletionRequest::greeting("gpt-3.5-turbo", &ExecutionSettings::default());

    let err = oa.chat_completion("bad", &req).await.unwrap_err();
    assert_eq!(err, ExecError::HttpError { status: 401, detail: Some("Incorrect API key provided".into()) });
  }

  #[tokio::test]
  async fn unparseable_body_is_malformed() {
    let endpoint = serve(Router::new().route("/v1/chat/completions", post(mock_garbage))).await;
    let oa = client_for(endpoint);
    let req = ChatCompletionRequest::greeting("gpt-3.5-turbo", &ExecutionSettings::default());

    let err = oa.chat_completion("k", &req).await.unwrap_err();
    assert!(matches!(err, ExecError::MalformedResponse(_)), "got {err:?}");
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_network_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let oa = client_for(format!("http://{addr}/v1/chat/completions"));
    let req = ChatCompletionRequest::greeting("gpt-3.5-turbo", &ExecutionSettings::default());

    let err = oa.chat_completion("k", &req).await.unwrap_err();
    assert!(matches!(err, ExecError::NetworkError(_)), "got {err:?}");
  }

  #[test]
  fn missing_choices_or_content_is_malformed() {
    let empty: ChatCompletionResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
    assert!(matches!(empty.first_reply(), Err(ExecError::MalformedResponse(_))));

    let null_content: ChatCompletionResponse =
      serde_json::from_value(json!({ "choices": [{ "message": { "content": null } }] })).unwrap();
    assert!(matches!(null_content.first_reply(), Err(ExecError::MalformedResponse(_))));
    assert_eq!(null_content.total_tokens(), None);
  }
}
